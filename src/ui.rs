use crate::config::CheckInConfig;
use crate::models::{Attendee, TeamKey};
use crate::store::CheckInStore;

/// What the page shows besides the store's own figures.
#[derive(Debug, Default)]
pub struct PageOptions<'a> {
    pub show_list: bool,
    pub filter: Option<&'a str>,
    pub greeting: Option<&'a Attendee>,
}

pub fn render_index(store: &CheckInStore, options: &PageOptions<'_>) -> String {
    let config = store.config();
    let pct = store.progress_percent();

    let greeting = options
        .greeting
        .map(|attendee| {
            format!(
                r#"<p class="greeting show" id="greeting">{}</p>"#,
                escape_html(&greeting_message(config, attendee))
            )
        })
        .unwrap_or_default();

    let celebration = if store.is_goal_reached() {
        format!(
            r#"<p class="celebration on" id="celebration">{}</p>"#,
            escape_html(&celebration_message(config, store.current_leader()))
        )
    } else {
        String::new()
    };

    fill_template(INDEX_HTML, |placeholder| match placeholder {
        "GREETING" => Some(greeting.clone()),
        "CELEBRATION" => Some(celebration.clone()),
        "TEAM_OPTIONS" => Some(team_options(config)),
        "TOTAL" => Some(store.total().to_string()),
        "TEAM_CARDS" => Some(team_cards(store)),
        "PCT" => Some(pct.to_string()),
        "GOAL" => Some(config.goal.to_string()),
        "LIST" => Some(attendee_section(store, options)),
        _ => None,
    })
}

/// Replaces each `{{NAME}}` in one left-to-right pass. Substituted text is
/// never scanned again, so placeholders inside user input stay literal.
fn fill_template(template: &str, mut value_for: impl FnMut(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => match value_for(&after[..end]) {
                Some(value) => {
                    out.push_str(&value);
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str("{{");
                    rest = after;
                }
            },
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn greeting_message(config: &CheckInConfig, attendee: &Attendee) -> String {
    format!(
        "Welcome, {}! You’re checked in with {}.",
        attendee.name,
        config.label_for(attendee.team.as_str())
    )
}

pub fn celebration_message(config: &CheckInConfig, leader: Option<&TeamKey>) -> String {
    match leader {
        Some(key) => format!("🎉 Goal reached! Current leader: {}.", config.label_for(key.as_str())),
        None => "🎉 Goal reached! It’s a tie at the top right now.".to_string(),
    }
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

fn team_options(config: &CheckInConfig) -> String {
    config
        .teams
        .iter()
        .map(|team| {
            format!(
                r#"<option value="{}">{}</option>"#,
                escape_html(team.key.as_str()),
                escape_html(&team.label)
            )
        })
        .collect()
}

fn team_cards(store: &CheckInStore) -> String {
    let leader = store.current_leader();
    store
        .config()
        .teams
        .iter()
        .map(|team| {
            let count = store.team_counts().get(&team.key).copied().unwrap_or(0);
            let class = if leader == Some(&team.key) { "stat team leader" } else { "stat team" };
            format!(
                r#"<div class="{class}" data-team="{key}"><span class="label">{label}</span><span class="value team-count">{count}</span></div>"#,
                key = escape_html(team.key.as_str()),
                label = escape_html(&team.label),
            )
        })
        .collect()
}

fn attendee_section(store: &CheckInStore, options: &PageOptions<'_>) -> String {
    let config = store.config();
    if !options.show_list {
        return r#"<a class="toggle" href="/?show=1">Show attendees</a>"#.to_string();
    }

    let mut filters = String::from(r#"<a class="toggle" href="/">Hide attendees</a><a class="chip" href="/?show=1">All</a>"#);
    for team in &config.teams {
        let active = if options.filter == Some(team.key.as_str()) { " active" } else { "" };
        filters.push_str(&format!(
            r#"<a class="chip{active}" href="/?show=1&amp;team={key}">{label}</a>"#,
            key = escape_html(team.key.as_str()),
            label = escape_html(&team.label),
        ));
    }

    let rows: String = store
        .filtered_attendees(options.filter)
        .into_iter()
        .map(|attendee| {
            format!(
                r#"<li class="attendee-row"><span class="attendee-name">{name}</span><span class="attendee-dot {team}"></span><span class="attendee-team">{label}</span></li>"#,
                name = escape_html(&attendee.name),
                team = escape_html(attendee.team.as_str()),
                label = escape_html(config.label_for(attendee.team.as_str())),
            )
        })
        .collect();

    format!(r#"<div class="filters">{filters}</div><ul id="attendee-list">{rows}</ul>"#)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Summit Check-In</title>
  <style>
    :root {
      --bg-1: #eef6f3;
      --bg-2: #bfe3d6;
      --ink: #1f2d2a;
      --accent: #0a8f6a;
      --accent-2: #1d4e89;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(29, 78, 137, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #e3f1fb 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
    }

    h1 {
      font-family: "Georgia", serif;
      margin: 0;
    }

    form {
      display: grid;
      grid-template-columns: 2fr 1fr auto;
      gap: 12px;
    }

    input, select, button {
      font: inherit;
      padding: 12px 16px;
      border-radius: 999px;
      border: 1px solid rgba(31, 45, 42, 0.2);
    }

    button {
      background: var(--accent);
      color: white;
      border: none;
      font-weight: 600;
      cursor: pointer;
    }

    .greeting, .celebration {
      margin: 0;
      padding: 14px 18px;
      border-radius: 16px;
      background: white;
    }

    .celebration {
      background: #fff4cf;
      font-weight: 600;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      display: grid;
      gap: 8px;
    }

    .stat .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #6f7d79;
    }

    .stat .value {
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .stat.leader {
      outline: 2px solid var(--accent);
    }

    .progress {
      background: rgba(29, 78, 137, 0.1);
      border-radius: 999px;
      height: 14px;
      overflow: hidden;
    }

    #progress-bar {
      background: var(--accent);
      height: 100%;
    }

    .filters {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
    }

    .chip, .toggle {
      color: var(--accent-2);
      text-decoration: none;
      padding: 6px 12px;
      border-radius: 999px;
      background: white;
    }

    .chip.active {
      background: var(--accent-2);
      color: white;
    }

    #attendee-list {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 6px;
    }

    .attendee-row {
      display: flex;
      gap: 10px;
      align-items: center;
      background: white;
      border-radius: 12px;
      padding: 10px 14px;
    }

    .attendee-dot {
      width: 10px;
      height: 10px;
      border-radius: 50%;
      background: var(--accent-2);
    }

    .attendee-team {
      margin-left: auto;
      color: #6f7d79;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Summit Check-In</h1>
    </header>

    <form id="checkin-form" method="post" action="/checkin">
      <input id="attendee-name" name="name" placeholder="Your name" autocomplete="off" />
      <select id="team-select" name="team" required>{{TEAM_OPTIONS}}</select>
      <button type="submit">Check in</button>
    </form>

    {{GREETING}}
    {{CELEBRATION}}

    <section class="panel">
      <div class="stat"><span class="label">Attendees</span><span class="value" id="total-count">{{TOTAL}}</span></div>
      {{TEAM_CARDS}}
    </section>

    <section>
      <div class="progress"><div id="progress-bar" style="width: {{PCT}}%" role="progressbar" aria-valuenow="{{PCT}}" aria-valuemax="100"></div></div>
      <p id="progress-label">{{PCT}}% of {{GOAL}}</p>
    </section>

    <section class="attendees">
      {{LIST}}
    </section>
  </main>
</body>
</html>
"#;
