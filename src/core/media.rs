//! # Media Source
//!
//! A hidden, looping clip player the avatar canvas copies frames from.
//!
//! Clips are addressed by the same fixed URLs the avatar states use
//! (`video/walk.mp4`, ...). A URL resolves by file stem to a text clip: either
//! a file in the configured asset directory or one of the clips embedded from
//! `assets/video/` at build time.
//!
//! ## Clip format
//!
//! ```text
//! # fps: 6          <- optional header, default 8 fps
//!   .----.
//!  | o  o |         <- frame 1
//! ---               <- frame separator
//!   .----.
//!  | -  - |         <- frame 2
//! ```
//!
//! A URL that resolves to nothing plays nothing. The canvas then shows a blank
//! surface, which is the accepted degraded behaviour for a missing asset.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

include!(concat!(env!("OUT_DIR"), "/builtin_clips.rs"));

pub const DEFAULT_CLIP_FPS: u32 = 8;
const FRAME_SEPARATOR: &str = "---";
const FPS_HEADER: &str = "# fps:";

// ============================================================================
// Frames and clips
// ============================================================================

/// One presentation frame: rows of text, one cell per `char`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    rows: Vec<Vec<char>>,
    width: usize,
}

impl Frame {
    pub fn from_text(text: &str) -> Self {
        let rows: Vec<Vec<char>> = text
            .lines()
            .map(|line| line.trim_end().chars().collect())
            .collect();
        let width = text
            .lines()
            .map(|line| line.trim_end().chars().count())
            .max()
            .unwrap_or(0);
        Self { rows, width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_blank(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(|c| c.is_whitespace()))
    }

    /// Character at frame coordinates, or a space outside the drawn area.
    pub fn cell(&self, col: usize, row: usize) -> char {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(' ')
    }

    /// Nearest-neighbour sample of this frame stretched over a `width` x
    /// `height` target, at target coordinates (`x`, `y`).
    pub fn sample(&self, x: u16, y: u16, width: u16, height: u16) -> char {
        if width == 0 || height == 0 || self.width == 0 || self.rows.is_empty() {
            return ' ';
        }
        let col = x as usize * self.width / width as usize;
        let row = y as usize * self.rows.len() / height as usize;
        self.cell(col, row)
    }
}

#[derive(Debug)]
pub enum ClipError {
    Io(std::io::Error),
    /// The clip text parsed but contained no drawable frame.
    Empty(String),
}

impl fmt::Display for ClipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipError::Io(e) => write!(f, "clip I/O error: {e}"),
            ClipError::Empty(name) => write!(f, "clip '{name}' has no frames"),
        }
    }
}

impl std::error::Error for ClipError {}

/// A decoded clip: frames plus a fixed frame interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clip {
    frames: Vec<Frame>,
    frame_interval: Duration,
}

impl Clip {
    pub fn parse(name: &str, text: &str) -> Result<Self, ClipError> {
        let mut fps = DEFAULT_CLIP_FPS;
        let mut body = text;

        if let Some(first) = text.lines().next()
            && let Some(value) = first.trim().strip_prefix(FPS_HEADER)
        {
            match value.trim().parse::<u32>() {
                Ok(n) if n > 0 => fps = n,
                _ => warn!("Clip '{}' has invalid fps header {:?}, using {}", name, first, fps),
            }
            body = text.split_once('\n').map(|(_, rest)| rest).unwrap_or("");
        }

        let mut frames = Vec::new();
        let mut current = String::new();
        for line in body.lines() {
            if line.trim_end() == FRAME_SEPARATOR {
                frames.push(Frame::from_text(&current));
                current.clear();
            } else {
                current.push_str(line);
                current.push('\n');
            }
        }
        frames.push(Frame::from_text(&current));
        frames.retain(|frame| !frame.is_blank());

        if frames.is_empty() {
            return Err(ClipError::Empty(name.to_string()));
        }

        Ok(Self {
            frames,
            frame_interval: Duration::from_millis(1000 / fps as u64),
        })
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Frame presented `elapsed` after playback started. Looping clips wrap;
    /// non-looping clips hold their last frame.
    pub fn frame_at(&self, elapsed: Duration, looping: bool) -> &Frame {
        let step = self.frame_interval.as_millis().max(1);
        let index = (elapsed.as_millis() / step) as usize;
        let last = self.frames.len() - 1;
        let index = if looping {
            index % self.frames.len()
        } else {
            index.min(last)
        };
        &self.frames[index]
    }
}

/// Maps a media URL to its clip key: `video/hello1.mp4` -> `hello1`.
pub fn clip_key(url: &str) -> Option<&str> {
    Path::new(url).file_stem().and_then(|s| s.to_str())
}

// ============================================================================
// Clip library
// ============================================================================

/// Resolves URLs to clips, caching both hits and misses.
pub struct ClipLibrary {
    asset_dir: Option<PathBuf>,
    cache: HashMap<String, Option<Arc<Clip>>>,
}

impl ClipLibrary {
    /// Library backed only by the clips embedded at build time.
    pub fn builtin() -> Self {
        Self {
            asset_dir: None,
            cache: HashMap::new(),
        }
    }

    /// Library that looks in `dir` first and falls back to the embedded clips.
    pub fn with_asset_dir(dir: PathBuf) -> Self {
        info!("Clip library using asset directory {}", dir.display());
        Self {
            asset_dir: Some(dir),
            cache: HashMap::new(),
        }
    }

    pub fn resolve(&mut self, url: &str) -> Option<Arc<Clip>> {
        let key = clip_key(url)?.to_string();
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }

        let clip = self.load(&key).map(Arc::new);
        if clip.is_none() {
            warn!("No clip for media URL '{}', avatar will render blank", url);
        }
        self.cache.insert(key, clip.clone());
        clip
    }

    fn load(&self, key: &str) -> Option<Clip> {
        if let Some(dir) = &self.asset_dir {
            let path = dir.join(format!("{key}.txt"));
            if path.exists() {
                match load_clip_file(key, &path) {
                    Ok(clip) => return Some(clip),
                    Err(e) => warn!("Failed to load clip {}: {}", path.display(), e),
                }
            }
        }

        let (_, text) = BUILTIN_CLIPS.iter().find(|(name, _)| *name == key)?;
        match Clip::parse(key, text) {
            Ok(clip) => Some(clip),
            Err(e) => {
                warn!("Embedded clip '{}' is unusable: {}", key, e);
                None
            }
        }
    }
}

fn load_clip_file(key: &str, path: &Path) -> Result<Clip, ClipError> {
    let text = fs::read_to_string(path).map_err(ClipError::Io)?;
    let clip = Clip::parse(key, &text)?;
    debug!("Loaded clip '{}' ({} frames) from {}", key, clip.frames.len(), path.display());
    Ok(clip)
}

// ============================================================================
// Media source
// ============================================================================

/// Playback flags of a media element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackFlags {
    pub muted: bool,
    pub autoplay: bool,
    pub looping: bool,
}

impl PlaybackFlags {
    /// Muted, autoplaying, looping: the avatar's hidden video element.
    pub const AVATAR: Self = Self {
        muted: true,
        autoplay: true,
        looping: true,
    };
}

/// Host capability: a video-like element with a mutable source URL and a
/// readable current presentation frame.
pub trait MediaSource {
    fn set_source(&mut self, url: &str);
    fn source(&self) -> &str;
    fn set_flags(&mut self, flags: PlaybackFlags);
    fn flags(&self) -> PlaybackFlags;
    /// (Re)start playback of the current source from its first frame.
    fn play(&mut self, now: Instant);
    /// `None` when nothing is loaded or playback hasn't started.
    fn current_frame(&self, now: Instant) -> Option<&Frame>;
}

/// Plays text clips resolved through a [`ClipLibrary`].
pub struct ClipPlayer {
    library: ClipLibrary,
    url: String,
    clip: Option<Arc<Clip>>,
    flags: PlaybackFlags,
    started: Option<Instant>,
}

impl ClipPlayer {
    pub fn new(library: ClipLibrary) -> Self {
        Self {
            library,
            url: String::new(),
            clip: None,
            flags: PlaybackFlags::default(),
            started: None,
        }
    }

    pub fn clip(&self) -> Option<&Clip> {
        self.clip.as_deref()
    }
}

impl MediaSource for ClipPlayer {
    fn set_source(&mut self, url: &str) {
        self.url = url.to_string();
        self.clip = self.library.resolve(url);
        self.started = None;
    }

    fn source(&self) -> &str {
        &self.url
    }

    fn set_flags(&mut self, flags: PlaybackFlags) {
        self.flags = flags;
    }

    fn flags(&self) -> PlaybackFlags {
        self.flags
    }

    fn play(&mut self, now: Instant) {
        self.started = Some(now);
    }

    fn current_frame(&self, now: Instant) -> Option<&Frame> {
        let clip = self.clip.as_deref()?;
        let elapsed = match self.started {
            Some(started) => now.saturating_duration_since(started),
            // Autoplay shows the first frame as soon as a source is loaded
            None if self.flags.autoplay => Duration::ZERO,
            None => return None,
        };
        Some(clip.frame_at(elapsed, self.flags.looping))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FRAMES: &str = "# fps: 10\nab\ncd\n---\nef\ngh\n";

    #[test]
    fn test_parse_fps_header_and_frames() {
        let clip = Clip::parse("t", TWO_FRAMES).unwrap();
        assert_eq!(clip.frames().len(), 2);
        assert_eq!(clip.frame_interval(), Duration::from_millis(100));
        assert_eq!(clip.frames()[1].cell(0, 1), 'g');
    }

    #[test]
    fn test_parse_without_header_uses_default_fps() {
        let clip = Clip::parse("t", "x\n").unwrap();
        assert_eq!(clip.frame_interval(), Duration::from_millis(1000 / DEFAULT_CLIP_FPS as u64));
    }

    #[test]
    fn test_parse_keeps_leading_indentation() {
        let clip = Clip::parse("t", "  /\\\n").unwrap();
        assert_eq!(clip.frames()[0].cell(0, 0), ' ');
        assert_eq!(clip.frames()[0].cell(2, 0), '/');
        assert_eq!(clip.frames()[0].width(), 4);
    }

    #[test]
    fn test_parse_empty_clip_is_an_error() {
        let err = Clip::parse("blank", "# fps: 4\n   \n---\n\n").unwrap_err();
        assert!(matches!(err, ClipError::Empty(ref name) if name == "blank"));
    }

    #[test]
    fn test_frame_at_loops() {
        let clip = Clip::parse("t", TWO_FRAMES).unwrap();
        let first = &clip.frames()[0];
        let second = &clip.frames()[1];
        assert_eq!(clip.frame_at(Duration::from_millis(0), true), first);
        assert_eq!(clip.frame_at(Duration::from_millis(150), true), second);
        assert_eq!(clip.frame_at(Duration::from_millis(200), true), first);
    }

    #[test]
    fn test_frame_at_holds_last_frame_without_loop() {
        let clip = Clip::parse("t", TWO_FRAMES).unwrap();
        assert_eq!(clip.frame_at(Duration::from_secs(10), false), &clip.frames()[1]);
    }

    #[test]
    fn test_sample_scales_nearest_neighbour() {
        let frame = Frame::from_text("ab\ncd\n");
        // 4x4 target: each source cell covers a 2x2 block
        assert_eq!(frame.sample(0, 0, 4, 4), 'a');
        assert_eq!(frame.sample(3, 0, 4, 4), 'b');
        assert_eq!(frame.sample(1, 3, 4, 4), 'c');
        assert_eq!(frame.sample(2, 2, 4, 4), 'd');
        assert_eq!(frame.sample(0, 0, 0, 4), ' ');
    }

    #[test]
    fn test_wide_chars_count_as_one_cell_each() {
        let frame = Frame::from_text("机器人\nab\n");
        assert_eq!(frame.width(), 3);
        // Stretched to 6 cells, each character covers two of them
        let row: String = (0..6).map(|x| frame.sample(x, 0, 6, 2)).collect();
        assert_eq!(row, "机机器器人人");
        assert_eq!(frame.sample(5, 1, 6, 2), ' ');
    }

    #[test]
    fn test_clip_key_uses_file_stem() {
        assert_eq!(clip_key("video/hello1.mp4"), Some("hello1"));
        assert_eq!(clip_key("walk.mp4"), Some("walk"));
        assert_eq!(clip_key(""), None);
    }

    #[test]
    fn test_builtin_library_has_every_avatar_clip() {
        let mut library = ClipLibrary::builtin();
        for url in ["video/hello.mp4", "video/hello1.mp4", "video/talk.mp4", "video/walk.mp4"] {
            assert!(library.resolve(url).is_some(), "missing builtin clip for {url}");
        }
    }

    #[test]
    fn test_unknown_url_resolves_to_nothing() {
        let mut library = ClipLibrary::builtin();
        assert!(library.resolve("video/dance.mp4").is_none());
        // Misses are cached too
        assert!(library.resolve("video/dance.mp4").is_none());
    }

    #[test]
    fn test_player_degrades_silently_on_missing_clip() {
        let mut player = ClipPlayer::new(ClipLibrary::builtin());
        player.set_flags(PlaybackFlags::AVATAR);
        let now = Instant::now();
        player.set_source("video/missing.mp4");
        player.play(now);
        assert_eq!(player.source(), "video/missing.mp4");
        assert!(player.current_frame(now).is_none());
    }

    #[test]
    fn test_player_needs_play_unless_autoplay() {
        let now = Instant::now();
        let mut player = ClipPlayer::new(ClipLibrary::builtin());
        player.set_source("video/walk.mp4");
        assert!(player.current_frame(now).is_none());

        player.set_flags(PlaybackFlags::AVATAR);
        assert!(player.current_frame(now).is_some());
    }

    #[test]
    fn test_play_restarts_from_first_frame() {
        let start = Instant::now();
        let mut player = ClipPlayer::new(ClipLibrary::builtin());
        player.set_flags(PlaybackFlags::AVATAR);
        player.set_source("video/walk.mp4");
        player.play(start);

        let later = start + Duration::from_millis(260);
        let first = player.clip().unwrap().frames()[0].clone();
        assert_ne!(player.current_frame(later), Some(&first));

        player.play(later);
        assert_eq!(player.current_frame(later), Some(&first));
    }
}
