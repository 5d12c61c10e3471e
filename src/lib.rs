pub mod actions;
pub mod app;
pub mod dialog;
pub mod icons;
pub mod lister;
pub mod prefs;
pub mod search;
pub mod settings;
pub mod ui_model;
