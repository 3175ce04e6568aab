mod agent;
mod editor;
mod hooks;
mod save;
