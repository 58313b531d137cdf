//! Sidebar and navigation commands.

use anyhow::Result;
use console::{Console, NavItem, RouteState, SidebarView};

use super::{print_json, remember};

/// Print the sidebar for the current user and page.
pub fn menu(console: &Console, output_json: bool) -> Result<()> {
    let sidebar = sidebar(console)?;
    if output_json {
        return print_json(&sidebar);
    }
    print!("{}", render_sidebar(&sidebar));
    Ok(())
}

/// Open or close a category, then print the sidebar.
pub async fn toggle(console: &Console, key: &str, output_json: bool) -> Result<()> {
    let before = sidebar(console)?;
    if !has_category(&before.main, key) && !has_category(&before.other, key) {
        anyhow::bail!("No category \"{}\" in the sidebar.", key);
    }
    console.toggle_category(key).await;
    menu(console, output_json)
}

/// Navigate, then print where the guard let us land.
pub async fn open(console: &Console, path: &str, output_json: bool) -> Result<()> {
    console.navigate(path).await;
    let route = remember(console)?;
    if output_json {
        return print_json(&route);
    }
    print!("{}", render_route(&route));
    Ok(())
}

fn sidebar(console: &Console) -> Result<SidebarView> {
    console
        .sidebar()
        .ok_or_else(|| anyhow::anyhow!("No sidebar on this page. Run `opsconsole login` first."))
}

fn has_category(items: &[NavItem], key: &str) -> bool {
    items.iter().any(|item| match item {
        NavItem::Category { key: k, children, .. } => k == key || has_category(children, key),
        NavItem::Leaf { .. } => false,
    })
}

fn render_sidebar(view: &SidebarView) -> String {
    let mut out = String::new();
    if view.collapsed {
        out.push_str("(collapsed)\n");
    }
    render_items(&view.main, 0, &mut out);
    if !view.other.is_empty() {
        out.push_str(&format!("-- {} --\n", view.other_label));
        render_items(&view.other, 0, &mut out);
    }
    out
}

fn render_items(items: &[NavItem], depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for item in items {
        match item {
            NavItem::Leaf {
                label, path, active, ..
            } => {
                let mark = if *active { '>' } else { ' ' };
                out.push_str(&format!("{}{} {}  {}\n", indent, mark, label, path));
            }
            NavItem::Category {
                key,
                label,
                active,
                open,
                children,
                ..
            } => {
                let mark = if *active { '>' } else { ' ' };
                let fold = if *open { "[-]" } else { "[+]" };
                out.push_str(&format!("{}{} {} {}  ({})\n", indent, mark, fold, label, key));
                if *open {
                    render_items(children, depth + 1, out);
                }
            }
        }
    }
}

fn render_route(route: &RouteState) -> String {
    let mut out = format!("Page: {:?}  {}\n", route.page, route.path);
    if let Some(from) = &route.from {
        out.push_str(&format!("Login required, will return to {}\n", from));
    }
    if !route.breadcrumbs.is_empty() {
        let trail: Vec<&str> = route.breadcrumbs.iter().map(|c| c.label.as_str()).collect();
        out.push_str(&format!("{}\n", trail.join(" / ")));
    }
    out
}
