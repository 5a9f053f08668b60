use clap::Subcommand;
use pomoclock_core::Preferences;

#[derive(Subcommand)]
pub enum BrandingAction {
    /// Print the current theme color and logo
    Show,
    /// Change the theme color and/or logo
    Apply {
        /// Theme color, e.g. "#e74c3c"
        #[arg(long)]
        color: Option<String>,
        /// Logo image URL; pass an empty string to remove
        #[arg(long)]
        logo: Option<String>,
    },
}

pub fn run(action: BrandingAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut prefs = Preferences::load()?;

    match action {
        BrandingAction::Show => {}
        BrandingAction::Apply { color, logo } => {
            if let Some(color) = color {
                prefs.branding.theme_color = color;
            }
            if let Some(logo) = logo {
                prefs.branding.logo_url = logo;
            }
            prefs = prefs.normalized();
            prefs.save()?;
        }
    }

    println!("{}", serde_json::to_string_pretty(&prefs.branding)?);
    Ok(())
}
