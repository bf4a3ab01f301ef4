use console::Style;
use photozone_core::config::BotConfig;
use photozone_core::consts::{RESTORE_BACKGROUND_ENHANCE, RESTORE_FIDELITY, RESTORE_UPSCALE};

struct Styles {
    title: Style,
    label: Style,
    value: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

/// Show a secret as set/unset plus its last four characters.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

pub fn print_bot_summary(config: &BotConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Photozone Bot"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(13)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(config.input_dir.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output_dir.display())
    );

    for (label, secret) in [
        ("Bot token", &config.telegram_token),
        ("Model token", &config.replicate_token),
    ] {
        if secret.is_empty() {
            println!("  {:<14}{}", s.label.apply_to(label), s.disabled.apply_to("missing"));
        } else {
            println!("  {:<14}{}", s.label.apply_to(label), s.value.apply_to(mask(secret)));
        }
    }

    let restore = &config.restore;
    println!(
        "  {:<14}{}",
        s.label.apply_to("CodeFormer"),
        s.value.apply_to(format!(
            "fidelity {RESTORE_FIDELITY}, upscale {RESTORE_UPSCALE}, background {}",
            if RESTORE_BACKGROUND_ENHANCE { "on" } else { "off" }
        ))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Endpoint"),
        s.path.apply_to(&restore.api_base)
    );
    println!();
}
