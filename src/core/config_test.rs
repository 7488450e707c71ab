#[cfg(test)]
mod tests {

    use std::path::PathBuf;
    use crate::core::{AppConfig, FfmpegTools};

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert!(config.ffmpeg_path.is_none());
        assert!(!config.display);
        assert!(config.parse_metadata);
    }

    #[test]
    fn test_tools_without_directory_use_path_lookup() {
        let tools = AppConfig::default().tools();
        assert_eq!(tools, FfmpegTools::default());
        assert_eq!(tools.probe, PathBuf::from("ffprobe"));
        assert_eq!(tools.player, PathBuf::from("ffplay"));
    }

    #[test]
    fn test_tools_with_directory() {
        let mut config = AppConfig::default();
        config.ffmpeg_path = Some(PathBuf::from("/usr/local/bin"));

        let tools = config.tools();
        assert_eq!(tools.probe, PathBuf::from("/usr/local/bin/ffprobe"));
        assert_eq!(tools.player, PathBuf::from("/usr/local/bin/ffplay"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.ffmpeg_path = Some(PathBuf::from("/opt/ffmpeg/bin"));
        config.display = true;
        config.save_to(&path).expect("Failed to save config");

        let loaded = AppConfig::load_from(&path).expect("Failed to load config");
        assert_eq!(loaded.ffmpeg_path, Some(PathBuf::from("/opt/ffmpeg/bin")));
        assert!(loaded.display);
        assert!(loaded.parse_metadata);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = AppConfig::load_from(&dir.path().join("absent.json")).expect("Failed to load");
        assert!(config.ffmpeg_path.is_none());
        assert!(config.parse_metadata);
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").expect("Failed to write file");

        let config = AppConfig::load_from(&path).expect("Failed to load");
        assert!(config.ffmpeg_path.is_none());
        assert!(!config.display);
    }

    #[test]
    fn test_config_backward_compatibility() {
        // Older files only carried the tool directory
        let old_config_json = r#"{ "ffmpeg_path": "/usr/local/bin" }"#;

        let config: AppConfig = serde_json::from_str(old_config_json).expect("Failed to parse old config");
        assert_eq!(config.ffmpeg_path, Some(PathBuf::from("/usr/local/bin")));
        assert!(!config.display);
        assert!(config.parse_metadata);
    }
}
