pub(crate) mod empty_state;
pub(crate) mod form;
pub(crate) mod layout;
pub(crate) mod modal;
pub(crate) mod pagination;
pub(crate) mod snackbar;
