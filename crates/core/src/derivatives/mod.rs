//! Derivatives module - domain models, lifecycle rules, services, and traits.

mod derivatives_diff;
mod derivatives_guard;
mod derivatives_lifecycle;
mod derivatives_model;
mod derivatives_service;
mod derivatives_traits;



pub use derivatives_diff::compute_diff;
pub use derivatives_guard::is_absolute;
pub use derivatives_lifecycle::LifecycleManager;
pub use derivatives_model::{
    AttributeValue, ChangeRecord, DeleteOutcome, Derivative, DerivativeAttribute,
    DerivativeFilter, DerivativeUpdate, DerivativeUpdates, NewDerivative, UpdateOutcome,
};
pub use derivatives_service::DerivativeService;
pub use derivatives_traits::{DerivativeRepositoryTrait, DerivativeServiceTrait};
