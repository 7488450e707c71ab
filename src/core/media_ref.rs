use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Anything that can name a media asset for the external tools.
///
/// The string is passed to `ffprobe`/`ffplay` verbatim, so a path, a URL
/// or a plain string all work.
pub trait MediaRef {
    fn media_ref(&self) -> String;
}

impl MediaRef for str {
    fn media_ref(&self) -> String {
        self.to_string()
    }
}

impl MediaRef for String {
    fn media_ref(&self) -> String {
        self.clone()
    }
}

impl MediaRef for Cow<'_, str> {
    fn media_ref(&self) -> String {
        self.to_string()
    }
}

impl MediaRef for Path {
    fn media_ref(&self) -> String {
        self.to_string_lossy().into_owned()
    }
}

impl MediaRef for PathBuf {
    fn media_ref(&self) -> String {
        self.as_path().media_ref()
    }
}

impl<T: MediaRef + ?Sized> MediaRef for &T {
    fn media_ref(&self) -> String {
        (**self).media_ref()
    }
}
