//! Built-in markup: the fallback page and the default templates written by
//! `uap init`.

use super::Page;

/// Stylesheet linked by the bundled templates, installed as
/// `<static_dir>/style.css`.
pub(crate) const STYLESHEET: &str = include_str!("../../templates/style.css");

/// Script used by the bundled templates to call the trigger endpoints,
/// installed as `<static_dir>/actions.js`.
pub(crate) const ACTIONS_SCRIPT: &str = include_str!("../../templates/actions.js");

pub(crate) fn bundled_template(page: Page) -> &'static str {
    match page {
        Page::Dashboard => include_str!("../../templates/dashboard.html"),
        Page::System => include_str!("../../templates/system.html"),
        Page::Monitoring => include_str!("../../templates/monitoring.html"),
        Page::Security => include_str!("../../templates/security.html"),
        Page::Backups => include_str!("../../templates/backups.html"),
    }
}

/// Self-contained page served when a template file is missing. Only
/// `{{current_time}}` is left for substitution.
pub(crate) fn fallback_page(title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Unix Admin Platform - {title}</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 0; padding: 0; background-color: #f5f5f5; }}
        header {{ background-color: #333; color: white; padding: 1rem; text-align: center; }}
        nav {{ background-color: #444; padding: 0.5rem; }}
        nav a {{ color: white; text-decoration: none; padding: 0.5rem 1rem; margin: 0 0.2rem; }}
        nav a:hover {{ background-color: #555; }}
        main {{ padding: 1rem; max-width: 1200px; margin: 0 auto; }}
        .card {{ background-color: white; border-radius: 5px; box-shadow: 0 2px 5px rgba(0,0,0,0.1); padding: 1rem; margin-bottom: 1rem; }}
        footer {{ background-color: #333; color: white; text-align: center; padding: 1rem; position: fixed; bottom: 0; width: 100%; }}
    </style>
</head>
<body>
    <header>
        <h1>Unix System Administration Platform</h1>
    </header>
    <nav>
        <a href="/">Dashboard</a>
        <a href="/system">System</a>
        <a href="/monitoring">Monitoring</a>
        <a href="/security">Security</a>
        <a href="/backups">Backups</a>
    </nav>
    <main>
        <h2>{title}</h2>
        <div class="card">
            <p>No template is installed for this page. Run <code>uap init</code> to install the default templates.</p>
        </div>
    </main>
    <footer>
        <p>Unix System Administration Platform | Current Time: {{{{current_time}}}}</p>
    </footer>
</body>
</html>
"#
    )
}
