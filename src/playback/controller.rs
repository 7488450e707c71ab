// =============================================================================
// PLAYBACK CONTROLLER - ONE FFPLAY PROCESS PER CONTROLLER
// =============================================================================
//
// play() hands the blocking spawn-and-wait sequence to a worker thread and
// returns at once. The caller, the worker and the shutdown hook share only
// the child handle (behind a mutex) and the state/stop flags (atomics).
//
// STATES:
//   NotStarted -> Starting -> Running -> Completed | Stopped | Failed
//
// The shutdown hook is removed before a terminal state is published, so a
// following play() never races an old worker for the hook.
//
// =============================================================================

use crate::core::{FfmpegTools, MediaRef, PlaybackError};
use crate::media::{MediaMetadata, MetadataProbe};
use crate::playback::shutdown::{shutdown_hooks, HookId, ShutdownHooks};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(25);

// =============================================================================
// STATE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PlaybackState {
    NotStarted = 0,
    Starting = 1,
    Running = 2,
    Completed = 3,
    Stopped = 4,
    Failed = 5,
}

impl PlaybackState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => PlaybackState::Starting,
            2 => PlaybackState::Running,
            3 => PlaybackState::Completed,
            4 => PlaybackState::Stopped,
            5 => PlaybackState::Failed,
            _ => PlaybackState::NotStarted,
        }
    }

    /// A player process is being started or is running
    pub fn is_active(&self) -> bool {
        matches!(self, PlaybackState::Starting | PlaybackState::Running)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PlaybackState::Completed | PlaybackState::Stopped | PlaybackState::Failed
        )
    }
}

// =============================================================================
// OPTIONS
// =============================================================================

/// Everything needed to build a [`PlaybackController`].
pub struct PlaybackOptions<M> {
    pub media: Option<M>,
    pub seek_time: Duration,
    /// Let the player open a window. Off by default.
    pub display: bool,
    /// Probe the media on construction to validate the seek time. On by default.
    pub parse_metadata: bool,
    pub shutdown_hooks: &'static ShutdownHooks,
}

impl<M> Default for PlaybackOptions<M> {
    fn default() -> Self {
        Self {
            media: None,
            seek_time: Duration::ZERO,
            display: false,
            parse_metadata: true,
            shutdown_hooks: shutdown_hooks(),
        }
    }
}

impl<M: MediaRef> PlaybackOptions<M> {
    pub fn new(media: M) -> Self {
        Self {
            media: Some(media),
            ..Self::default()
        }
    }

    pub fn seek_time(mut self, seek_time: Duration) -> Self {
        self.seek_time = seek_time;
        self
    }

    pub fn display(mut self) -> Self {
        self.display = true;
        self
    }

    pub fn no_metadata(mut self) -> Self {
        self.parse_metadata = false;
        self
    }

    pub fn shutdown_hooks(mut self, hooks: &'static ShutdownHooks) -> Self {
        self.shutdown_hooks = hooks;
        self
    }
}

// =============================================================================
// SHARED SESSION
// =============================================================================

/// State shared between the controller, its worker and its shutdown hook
struct Session {
    media: String,
    player: PathBuf,
    state: AtomicU8,
    stop_requested: AtomicBool,
    child: Mutex<Option<Child>>,
    hooks: &'static ShutdownHooks,
}

impl Session {
    fn state(&self) -> PlaybackState {
        PlaybackState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, state: PlaybackState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    /// Move to Starting unless a player is already starting or running
    fn begin(&self) -> Result<(), PlaybackError> {
        self.state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                if PlaybackState::from_u8(current).is_active() {
                    None
                } else {
                    Some(PlaybackState::Starting as u8)
                }
            })
            .map(|_| ())
            .map_err(|_| PlaybackError::AlreadyRunning(self.media.clone()))
    }

    fn lock_child(&self) -> MutexGuard<'_, Option<Child>> {
        self.child.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Only takes effect while a player is starting or running. The state
    /// check and the flag write happen under the child lock, which is also
    /// held when the worker publishes its handle and when finish() clears
    /// the flag.
    fn stop(&self) {
        let mut slot = self.lock_child();
        if !self.state().is_active() {
            return;
        }
        self.stop_requested.store(true, Ordering::SeqCst);
        if let Some(child) = slot.as_mut() {
            log::debug!("Killing player process {} for {}", child.id(), self.media);
            if let Err(e) = child.kill() {
                log::debug!("Kill failed, player has probably exited: {}", e);
            }
        }
    }

    /// Worker body: start the player, wait for it, publish the outcome.
    fn run(&self, args: Vec<String>, hook_id: HookId) {
        let child = Command::new(&self.player)
            .args(&args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(source) => {
                let error = PlaybackError::Spawn {
                    tool: self.player.clone(),
                    source,
                };
                log::warn!("Error while trying to play {}: {}", self.media, error);
                self.finish(PlaybackState::Failed, hook_id);
                return;
            }
        };

        {
            let mut slot = self.lock_child();
            let mut child = child;
            // stop() may have run before the handle was visible to it
            if self.stop_requested.load(Ordering::SeqCst) {
                if let Err(e) = child.kill() {
                    log::debug!("Kill of freshly started player failed: {}", e);
                }
            }
            log::debug!("Player process {} started for {}", child.id(), self.media);
            *slot = Some(child);
            self.set_state(PlaybackState::Running);
        }

        let outcome = self.wait_for_exit();
        let stopped = self.stop_requested.load(Ordering::SeqCst);

        let state = match outcome {
            Ok(_) if stopped => {
                log::debug!("Playback of {} stopped", self.media);
                PlaybackState::Stopped
            }
            Ok(status) => {
                if status.code().is_none() {
                    let error = PlaybackError::UnexpectedInterruption {
                        media: self.media.clone(),
                        reason: format!("player terminated externally ({})", status),
                    };
                    log::warn!("{}", error);
                } else {
                    log::info!("Playback of {} finished ({})", self.media, status);
                }
                PlaybackState::Completed
            }
            Err(_) if stopped => PlaybackState::Stopped,
            Err(e) => {
                let error = PlaybackError::UnexpectedInterruption {
                    media: self.media.clone(),
                    reason: e.to_string(),
                };
                log::warn!("{}", error);
                if let Some(mut child) = self.lock_child().take() {
                    if let Err(e) = child.kill() {
                        log::debug!("Kill after failed wait did not succeed: {}", e);
                    }
                    if let Err(e) = child.wait() {
                        log::debug!("Could not reap player process: {}", e);
                    }
                }
                PlaybackState::Failed
            }
        };

        self.finish(state, hook_id);
    }

    /// Poll the child until it exits. The lock is only held per poll so
    /// stop() can reach the handle in between.
    fn wait_for_exit(&self) -> std::io::Result<ExitStatus> {
        loop {
            {
                let mut slot = self.lock_child();
                let Some(child) = slot.as_mut() else {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "player handle disappeared",
                    ));
                };
                if let Some(status) = child.try_wait()? {
                    *slot = None;
                    return Ok(status);
                }
            }
            thread::sleep(WAIT_POLL_INTERVAL);
        }
    }

    fn finish(&self, state: PlaybackState, hook_id: HookId) {
        self.hooks.deregister(hook_id);
        let _slot = self.lock_child();
        self.stop_requested.store(false, Ordering::SeqCst);
        self.set_state(state);
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// Plays one media asset through `ffplay`.
///
/// ```no_run
/// use press_play::{FfmpegTools, PlaybackController, PlaybackOptions};
/// use std::time::Duration;
///
/// let options = PlaybackOptions::new("/music/track.mp3").seek_time(Duration::from_secs(10));
/// let player = PlaybackController::new(options, &FfmpegTools::default())?;
/// player.play()?;
/// // ...
/// player.stop();
/// # Ok::<(), press_play::PlaybackError>(())
/// ```
pub struct PlaybackController<M> {
    media: M,
    metadata: Option<MediaMetadata>,
    seek_time: Duration,
    display: bool,
    session: Arc<Session>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<M: MediaRef> PlaybackController<M> {
    /// Build a controller, probing the media first unless disabled.
    ///
    /// The seek time drops to zero when the probe fails, finds no metadata,
    /// or the requested position is not before the end of the media.
    pub fn new(options: PlaybackOptions<M>, tools: &FfmpegTools) -> Result<Self, PlaybackError> {
        let media = options.media.ok_or(PlaybackError::MissingMedia)?;
        let media_ref = media.media_ref();
        let requested = options.seek_time;

        let mut metadata = None;
        let seek_time = if options.parse_metadata {
            match MetadataProbe::from_tools(tools).probe(&media_ref) {
                Ok(Some(probed)) => {
                    let duration = probed.duration();
                    metadata = Some(probed);
                    if requested >= duration {
                        if !requested.is_zero() {
                            log::debug!(
                                "Seek time {}ms is past duration {}ms of {}, starting from zero",
                                requested.as_millis(),
                                duration.as_millis(),
                                media_ref
                            );
                        }
                        Duration::ZERO
                    } else {
                        requested
                    }
                }
                Ok(None) => {
                    log::warn!("No metadata for {}, using seek time of zero", media_ref);
                    Duration::ZERO
                }
                Err(e) => {
                    log::warn!("Error parsing metadata, using seek time of zero: {}", e);
                    Duration::ZERO
                }
            }
        } else {
            requested
        };

        Ok(Self {
            media,
            metadata,
            seek_time,
            display: options.display,
            session: Arc::new(Session {
                media: media_ref,
                player: tools.player.clone(),
                state: AtomicU8::new(PlaybackState::NotStarted as u8),
                stop_requested: AtomicBool::new(false),
                child: Mutex::new(None),
                hooks: options.shutdown_hooks,
            }),
            worker: Mutex::new(None),
        })
    }
}

impl<M> PlaybackController<M> {
    /// Start the player on a worker thread and return immediately.
    ///
    /// Failures after this point are logged, never returned. A shutdown hook
    /// stops the player if the host exits first; it is removed once the
    /// player is gone.
    pub fn play(&self) -> Result<(), PlaybackError> {
        self.session.begin()?;

        log::debug!(
            "Playing {} starting at {}ms display={}",
            self.session.media,
            self.seek_time.as_millis(),
            self.display
        );

        let hook_session = Arc::clone(&self.session);
        let hook_id = self.session.hooks.register(move || {
            log::info!("Host shutting down, stopping playback of {}", hook_session.media);
            hook_session.stop();
        });

        let args = self.command_args();
        let session = Arc::clone(&self.session);
        let handle = thread::spawn(move || session.run(args, hook_id));

        let previous = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            // Already terminal, so this returns immediately
            if previous.join().is_err() {
                log::error!("Previous playback worker for {} panicked", self.session.media);
            }
        }
        Ok(())
    }

    /// Kill the player if one is running. Safe to call at any time, any number of times.
    pub fn stop(&self) {
        self.session.stop();
    }

    /// Block until the current worker, if any, has finished.
    pub fn join(&self) {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                log::error!("Playback worker for {} panicked", self.session.media);
            }
        }
    }

    /// Arguments passed to the player, after the tool itself
    pub fn command_args(&self) -> Vec<String> {
        // -hide_banner is a harmless stand-in that lets ffplay open its window
        let display_flag = if self.display { "-hide_banner" } else { "-nodisp" };
        vec![
            "-i".to_string(),
            self.session.media.clone(),
            display_flag.to_string(),
            "-v".to_string(),
            "quiet".to_string(),
            "-ss".to_string(),
            format!("{:.3}", self.seek_time.as_millis() as f64 / 1000.0),
        ]
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    /// Metadata read at construction; `None` if probing was disabled or failed
    pub fn metadata(&self) -> Option<&MediaMetadata> {
        self.metadata.as_ref()
    }

    pub fn seek_time(&self) -> Duration {
        self.seek_time
    }

    /// Change the start position for the next `play()`. Not checked against the duration.
    pub fn set_seek_time(&mut self, seek_time: Duration) {
        self.seek_time = seek_time;
    }

    pub fn is_display(&self) -> bool {
        self.display
    }

    pub fn state(&self) -> PlaybackState {
        self.session.state()
    }
}
