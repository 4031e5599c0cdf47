mod linkified;
mod modal_view;
mod month_view;
mod toolbar;

pub use linkified::Linkified;
pub use modal_view::ModalView;
pub use month_view::MonthView;
pub use toolbar::Toolbar;
