pub mod draft;
pub mod endpoint;
pub mod form;
pub mod list;
pub mod page;

pub use draft::{Draft, FieldKind, FieldSpec};
pub use endpoint::{Endpoint, Messages};
pub use form::{FormAction, FormMode, FormModal};
pub use list::{ListState, PendingDelete};
pub use page::CrudPage;
