//! Calendar model shared by the native
//! tools, the server and the browser
//! front-end. Nothing here touches the
//! network or the filesystem.

pub mod aggregate;
pub mod api;
pub mod date;
pub mod event;
pub mod grid;
pub mod modal;
pub mod state;
pub mod text;
pub mod weather;

pub use aggregate::{
  Aggregator,
  DateRange,
  SourceKind
};
pub use event::Event;
pub use grid::{
  GridLayout,
  MonthGrid,
  build_month_grid
};
pub use modal::Modal;
pub use state::{
  Action,
  CalendarState
};
