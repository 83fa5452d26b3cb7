use crate::api::page::PageContext;
use crate::bridge::protocol::Command;

pub const GENERIC_ERROR_TITLE: &str = "Erreur";
pub const GENERIC_ERROR_TEXT: &str = "Une erreur est survenue, veuillez réessayer plus tard";

/// Regions frozen while the alert box is up.
const LOCKED: [&str; 2] = ["header", "main"];

/// Show the alert box and freeze the page behind it.
pub fn open_alert(ctx: &mut PageContext, title: &str, text: &str) {
    log::info!("alert: {}", title);
    ctx.emit(Command::alert(title, text));
    for region in LOCKED {
        ctx.emit(Command::set_style(
            region,
            &[("overflow", "hidden"), ("pointer-events", "none")],
        ));
    }
}

/// The alert's button: hide the box and give the page back.
pub fn close_alert(ctx: &mut PageContext) {
    ctx.emit(Command::CloseAlert);
    for region in LOCKED {
        ctx.emit(Command::clear_style(region));
    }
}
