pub mod browser;
pub mod redirect;

pub use browser::ChromiumLauncher;
pub use redirect::RedirectResolver;
