//! # TUI Components
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: avatar state, speech engine and status
//! - `Message`: one chat entry
//! - `SendButton`: clickable submit control
//! - `Notice`: blocking modal
//! - `AvatarCanvas`: blits the avatar's `CellSurface`
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `InputBox`: single-line text field
//! - `MessageList`: scrollable transcript with height caching
//!
//! Components receive data as props (struct fields or constructor
//! arguments) instead of reading `App` directly:
//!
//! ```rust,ignore
//! TitleBar::new(app.avatar.state(), voice, app.status_message.clone()).render(frame, area);
//! ```
//!
//! ```text
//! components/
//! ├── mod.rs            (this file)
//! ├── avatar_canvas.rs  (CellSurface + AvatarCanvas)
//! ├── input_box.rs      (text field)
//! ├── message.rs        (single entry)
//! ├── message_list.rs   (scrollable transcript)
//! ├── notice.rs         (blocking modal)
//! ├── send_button.rs    (send control)
//! └── title_bar.rs      (header line)
//! ```

pub mod avatar_canvas;
pub mod input_box;
pub mod message;
pub mod message_list;
pub mod notice;
pub mod send_button;
mod title_bar;

pub use avatar_canvas::{AvatarCanvas, CellSurface};
pub use input_box::{InputBox, InputEvent};
pub use message_list::{MessageList, MessageListState};
pub use notice::{Notice, NoticeEvent};
pub use send_button::{SEND_BUTTON_WIDTH, SendButton};
pub use title_bar::TitleBar;
