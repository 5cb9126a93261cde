use repostats::{CredentialStore, Theme};

/// Show the saved theme, or save a new one.
pub(crate) fn handle_theme(
    theme: Option<Theme>,
    store: &dyn CredentialStore,
) -> Result<(), Box<dyn std::error::Error>> {
    match theme {
        Some(theme) => {
            theme.save(store)?;
            println!("Theme set to {theme}");
        }
        None => {
            let theme = Theme::load(store)?.unwrap_or_default();
            println!("{theme}");
        }
    }
    Ok(())
}
