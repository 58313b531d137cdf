//! Sign-in, role and locale commands.

use anyhow::Result;
use console::{role_label, Console};

use super::{print_json, remember};

/// Sign in and land where the last run was bounced from, or home.
pub async fn login(
    console: &Console,
    name: &str,
    role: &str,
    permissions: Option<Vec<String>>,
) -> Result<()> {
    console.login(name, role, permissions).await;
    let auth = console.auth();
    if let Some(error) = auth.error {
        anyhow::bail!("Login failed: {}", error);
    }
    let user = auth
        .user
        .ok_or_else(|| anyhow::anyhow!("Login did not produce a session."))?;
    let route = remember(console)?;
    println!("Logged in as {} ({}).", user.name, role_label(&user.role));
    println!("Now at {}.", route.path);
    Ok(())
}

pub async fn logout(console: &Console) -> Result<()> {
    if console.user().is_none() {
        println!("Not logged in.");
        return Ok(());
    }
    console.logout().await;
    remember(console)?;
    println!("Logged out.");
    Ok(())
}

/// Print the session user and what they may do.
pub fn whoami(console: &Console, output_json: bool) -> Result<()> {
    let Some(user) = console.user() else {
        anyhow::bail!("Not logged in. Run `opsconsole login --name <name>`.");
    };
    let perms = console.permissions();
    let mut granted: Vec<&str> = perms.iter().collect();
    granted.sort_unstable();

    if output_json {
        return print_json(&serde_json::json!({
            "user": user,
            "effectivePermissions": granted,
        }));
    }
    println!("Name:        {}", user.name);
    if let Some(email) = &user.email {
        println!("Email:       {}", email);
    }
    println!("Role:        {} ({})", role_label(&user.role), user.role);
    println!("Permissions: {}", granted.join(", "));
    Ok(())
}

pub async fn switch_role(console: &Console, role: &str) -> Result<()> {
    if !console.context().config.dev_role_switch {
        anyhow::bail!("Role switching is disabled (dev_role_switch = false).");
    }
    if console.user().is_none() {
        anyhow::bail!("Not logged in.");
    }
    console.switch_role(role).await;
    let route = remember(console)?;
    if let Some(user) = console.user() {
        println!("Role is now {}.", role_label(&user.role));
    }
    if route.path != route.requested {
        println!("{} is not available, now at {}.", route.requested, route.path);
    }
    Ok(())
}

pub async fn locale(console: &Console, code: &str) -> Result<()> {
    let known = console.i18n().locales();
    if !known.iter().any(|l| l == code) {
        anyhow::bail!("Unknown locale {}. Available: {}", code, known.join(", "));
    }
    console.set_locale(code).await;
    let state = console
        .locale()
        .ok_or_else(|| anyhow::anyhow!("Locale state missing."))?;
    println!("Locale set to {} ({}).", state.locale, state.title);
    Ok(())
}
