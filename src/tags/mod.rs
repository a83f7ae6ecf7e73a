pub mod client;
pub mod form;
pub mod slug;
pub mod types;
pub mod validation;

pub use client::{HttpTagService, TagService};
pub use form::{CreateTagForm, FormHooks, FormState, FormView, NoHooks, SubmitOutcome};
pub use slug::derive_slug;
pub use types::{NewTag, TagDraft, TagId, TagRecord};
pub use validation::{validate_title, Field, FieldError, ValidationRule, TITLE_RULES};
