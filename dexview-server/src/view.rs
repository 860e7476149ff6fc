///! HTML rendering for the list, detail and spotlight views
///!
///! Pages are assembled as plain strings. The only client-side logic is a
///! debounced name filter over the cards already on the page; everything
///! else is rendered here from query-layer outputs.

use dexview_core::display::{format_dex_id, type_color, weaknesses};
use dexview_core::types::{PokemonDetail, PokemonRecord, ResolvedEvolution};
use dexview_core::{FetchError, PageSnapshot};

const FILTER_DEBOUNCE_MS: u32 = 500;

/// Case-insensitive substring match used by the server-side (no-script)
/// rendition of the name filter. An empty needle matches everything.
pub fn matches_filter(name: &str, needle: &str) -> bool {
    needle.is_empty() || name.to_lowercase().contains(&needle.to_lowercase())
}

/// The subset of the loaded page visible under the current filter text.
/// Filtering only ever applies to the names on this page, never across the
/// whole catalog.
pub fn filter_records<'a>(records: &'a [PokemonRecord], needle: &str) -> Vec<&'a PokemonRecord> {
    records
        .iter()
        .filter(|record| matches_filter(&record.name, needle))
        .collect()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} - Dexview</title>
<style>
body {{ font-family: system-ui, sans-serif; margin: 0; background: #f4f6fb; color: #1f2430; }}
main {{ max-width: 72rem; margin: 0 auto; padding: 2rem; }}
a {{ color: inherit; }}
.grid {{ display: grid; grid-template-columns: repeat(auto-fill, minmax(11rem, 1fr)); gap: 1rem; }}
.card {{ background: #fff; border-radius: 0.75rem; padding: 1rem; text-align: center; box-shadow: 0 1px 3px rgba(0,0,0,.12); }}
.card img {{ width: 6rem; height: 6rem; object-fit: contain; }}
.card .dex-id {{ color: #8a8f9c; font-size: .8rem; }}
.card h3 {{ margin: .25rem 0; text-transform: capitalize; }}
.badge {{ display: inline-block; color: #fff; border-radius: 999px; padding: .1rem .6rem; font-size: .75rem; margin: 0 .1rem; text-transform: capitalize; }}
.pager {{ display: flex; justify-content: center; gap: 1rem; margin: 1.5rem 0; align-items: center; }}
.pager a, .pager span.disabled {{ padding: .4rem 1rem; border-radius: .5rem; background: #fff; border: 1px solid #d4d8e2; text-decoration: none; }}
.pager span.disabled {{ opacity: .5; }}
.notice {{ border-radius: .5rem; padding: .75rem 1rem; margin: 1rem 0; }}
.notice.error {{ background: #fde8e8; border: 1px solid #f5b5b5; }}
.notice.warning {{ background: #fdf6e3; border: 1px solid #ecd9a0; }}
.notice .dismiss {{ float: right; text-decoration: none; font-weight: bold; }}
.spotlight {{ background: #fff; border-radius: .75rem; padding: 1.5rem; box-shadow: 0 1px 3px rgba(0,0,0,.12); }}
.spotlight img {{ width: 10rem; height: 10rem; object-fit: contain; display: block; margin: 0 auto; }}
.columns {{ display: grid; grid-template-columns: 3fr 1fr; gap: 1.5rem; align-items: start; }}
.statbar {{ background: #e6e9f2; border-radius: 999px; height: .5rem; overflow: hidden; }}
.statbar span {{ display: block; height: 100%; }}
.stats td {{ padding: .2rem .5rem; font-size: .9rem; }}
.stats td:first-child {{ text-transform: capitalize; color: #5a6070; }}
.evolution {{ display: flex; gap: 1rem; flex-wrap: wrap; align-items: flex-start; }}
.evolution .member {{ text-align: center; font-size: .8rem; text-transform: capitalize; }}
.evolution .member img {{ width: 4rem; height: 4rem; object-fit: contain; }}
input#filter {{ width: 100%; padding: .9rem 1rem; border-radius: .6rem; border: 1px solid #d4d8e2; font-size: 1rem; margin-bottom: 1.5rem; box-sizing: border-box; }}
</style>
</head>
<body>
<main>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
        body = body,
    )
}

fn filter_script() -> String {
    format!(
        r#"<script>
(function () {{
  var input = document.getElementById('filter');
  if (!input) return;
  var timer = null;
  input.addEventListener('input', function () {{
    clearTimeout(timer);
    timer = setTimeout(function () {{
      var needle = input.value.toLowerCase();
      var empty = true;
      document.querySelectorAll('.grid .card').forEach(function (card) {{
        var show = !needle || card.dataset.name.indexOf(needle) !== -1;
        card.style.display = show ? '' : 'none';
        if (show) empty = false;
      }});
      var none = document.getElementById('no-matches');
      if (none) none.style.display = empty ? '' : 'none';
    }}, {debounce});
  }});
}})();
</script>"#,
        debounce = FILTER_DEBOUNCE_MS,
    )
}

fn error_notice(message: &str) -> String {
    format!(
        r##"<div class="notice error"><a class="dismiss" href="#" onclick="this.parentElement.remove(); return false;">&times;</a>{}</div>"##,
        escape(message)
    )
}

fn type_badges(record: &PokemonRecord) -> String {
    record
        .types
        .iter()
        .map(|slot| {
            format!(
                r#"<span class="badge" style="background:{}">{}</span>"#,
                type_color(&slot.kind.name),
                escape(&slot.kind.name)
            )
        })
        .collect()
}

fn card(record: &PokemonRecord) -> String {
    let image = record
        .sprites
        .display_image()
        .map(|url| format!(r#"<img src="{}" alt="{}">"#, escape(url), escape(&record.name)))
        .unwrap_or_default();
    format!(
        r#"<a class="card" data-name="{name}" href="/pokemon/{id}">
{image}
<div class="dex-id">#{dex}</div>
<h3>{name}</h3>
<div>{badges}</div>
</a>"#,
        name = escape(&record.name),
        id = record.id,
        dex = format_dex_id(record.id),
        image = image,
        badges = type_badges(record),
    )
}

fn pager_controls(snapshot: &PageSnapshot) -> String {
    let previous = if snapshot.has_previous && !snapshot.is_placeholder {
        format!(
            r#"<a href="/?page={}">&larr; Previous</a>"#,
            snapshot.current_page - 1
        )
    } else {
        r#"<span class="disabled">&larr; Previous</span>"#.to_string()
    };
    let next = if snapshot.has_next && !snapshot.is_placeholder {
        format!(r#"<a href="/?page={}">Next &rarr;</a>"#, snapshot.current_page + 1)
    } else {
        r#"<span class="disabled">Next &rarr;</span>"#.to_string()
    };
    format!(
        r#"<div class="pager">
{previous}
<span>Page {page} of {total} &middot; {entries} entries</span>
{next}
</div>"#,
        previous = previous,
        page = snapshot.current_page,
        total = snapshot.total_pages,
        entries = snapshot.total_entries,
        next = next,
    )
}

fn grid_section(outcome: &Result<PageSnapshot, FetchError>, needle: &str) -> String {
    let snapshot = match outcome {
        Ok(snapshot) => snapshot,
        Err(err) => {
            return error_notice(&format!("Could not load this page: {}", err));
        }
    };

    let visible = filter_records(&snapshot.entries, needle);
    let no_matches_hidden = if visible.is_empty() && !needle.is_empty() {
        ""
    } else {
        r#" style="display:none""#
    };
    let cards: String = visible.iter().map(|record| card(record)).collect();

    format!(
        r#"<input id="filter" type="search" placeholder="Search your Pok&eacute;mon!" value="{needle}" autocomplete="off">
<div id="no-matches" class="notice warning"{no_matches_hidden}>No entries on this page match the filter.</div>
<div class="grid">
{cards}
</div>
{pager}"#,
        needle = escape(needle),
        no_matches_hidden = no_matches_hidden,
        cards = cards,
        pager = pager_controls(snapshot),
    )
}

fn stat_rows(record: &PokemonRecord) -> String {
    let mut rows: String = record
        .stats
        .iter()
        .map(|stat| {
            let percent = (stat.base_stat.min(255) as f64 / 255.0 * 100.0).round();
            format!(
                r#"<tr><td>{}</td><td>{}</td><td style="width:50%"><div class="statbar"><span style="width:{}%;background:#6890F0"></span></div></td></tr>"#,
                escape(&stat.stat.name),
                stat.base_stat,
                percent
            )
        })
        .collect();
    rows.push_str(&format!(
        r#"<tr><td>total</td><td>{}</td><td></td></tr>"#,
        record.total_base_stats()
    ));
    rows
}

fn evolution_member(member: &ResolvedEvolution) -> String {
    let image = member
        .sprites
        .display_image()
        .map(|url| format!(r#"<img src="{}" alt="{}">"#, escape(url), escape(&member.name)))
        .unwrap_or_default();
    let level = member
        .min_level
        .map(|level| format!("<div>Lvl {}</div>", level))
        .unwrap_or_default();
    format!(
        r#"<a class="member" href="/pokemon/{id}">
{image}
<div>{name}</div>
{level}
</a>"#,
        id = member.id,
        image = image,
        name = escape(&member.name),
        level = level,
    )
}

fn detail_body(detail: &PokemonDetail) -> String {
    let record = &detail.record;
    let accent = type_color(record.primary_type().unwrap_or("water"));
    let image = record
        .sprites
        .display_image()
        .map(|url| format!(r#"<img src="{}" alt="{}">"#, escape(url), escape(&record.name)))
        .unwrap_or_default();
    let abilities: String = record
        .abilities
        .iter()
        .filter_map(|slot| slot.ability.as_ref())
        .map(|ability| {
            format!(
                r#"<span class="badge" style="background:#8a8f9c">{}</span>"#,
                escape(&ability.name.replace('-', " "))
            )
        })
        .collect();
    let weakness_badges: String = weaknesses(record)
        .iter()
        .map(|weakness| {
            format!(
                r#"<span class="badge" style="background:{}">{}</span>"#,
                type_color(weakness),
                weakness
            )
        })
        .collect();
    let members: String = detail
        .evolution_chain
        .iter()
        .map(evolution_member)
        .collect();
    let base_exp = record
        .base_experience
        .map(|exp| exp.to_string())
        .unwrap_or_else(|| "&mdash;".to_string());

    format!(
        r#"<p><a href="/">&larr; Back to the grid</a></p>
<div class="spotlight" style="border-top: 4px solid {accent}">
{image}
<div class="dex-id">#{dex}</div>
<h1 style="text-transform:capitalize; margin:.25rem 0">{name}</h1>
<div>{badges}</div>
<h2>Abilities</h2>
<div>{abilities}</div>
<h2>Profile</h2>
<table class="stats">
<tr><td>height</td><td>{height}</td><td></td></tr>
<tr><td>weight</td><td>{weight}</td><td></td></tr>
<tr><td>base exp</td><td>{base_exp}</td><td></td></tr>
</table>
<h2>Weaknesses</h2>
<div>{weakness_badges}</div>
<h2>Stats</h2>
<table class="stats">
{stats}
</table>
<h2>Evolution</h2>
<div class="evolution">
{members}
</div>
</div>"#,
        accent = accent,
        image = image,
        dex = format_dex_id(record.id),
        name = escape(&record.name),
        badges = type_badges(record),
        abilities = abilities,
        height = record.height,
        weight = record.weight,
        base_exp = base_exp,
        weakness_badges = weakness_badges,
        stats = stat_rows(record),
        members = members,
    )
}

fn spotlight_section(outcome: &Result<PokemonDetail, FetchError>) -> String {
    let inner = match outcome {
        Ok(detail) => {
            let record = &detail.record;
            let image = record
                .sprites
                .display_image()
                .map(|url| format!(r#"<img src="{}" alt="{}">"#, escape(url), escape(&record.name)))
                .unwrap_or_default();
            let members: String = detail
                .evolution_chain
                .iter()
                .map(evolution_member)
                .collect();
            format!(
                r#"{image}
<div class="dex-id">#{dex}</div>
<h2 style="text-transform:capitalize; margin:.25rem 0"><a href="/pokemon/{id}">{name}</a></h2>
<div>{badges}</div>
<h3>Evolution</h3>
<div class="evolution">
{members}
</div>"#,
                image = image,
                dex = format_dex_id(record.id),
                id = record.id,
                name = escape(&record.name),
                badges = type_badges(record),
                members = members,
            )
        }
        Err(err) => error_notice(&format!("Could not load the spotlight entry: {}", err)),
    };

    format!(
        r#"<aside class="spotlight">
<h2>Spotlight</h2>
{inner}
<p><a href="/spotlight/next">&#x21bb; Show me another</a></p>
</aside>"#,
        inner = inner,
    )
}

pub fn render_home(
    grid: &Result<PageSnapshot, FetchError>,
    spotlight: &Result<PokemonDetail, FetchError>,
    needle: &str,
) -> String {
    let body = format!(
        r#"<h1>Dexview</h1>
<div class="columns">
<section>
{grid}
</section>
{spotlight}
</div>
{script}"#,
        grid = grid_section(grid, needle),
        spotlight = spotlight_section(spotlight),
        script = filter_script(),
    );
    layout("Catalog", &body)
}

pub fn render_detail(detail: &PokemonDetail) -> String {
    layout(&detail.record.name, &detail_body(detail))
}

pub fn render_detail_error(id: u32, err: &FetchError) -> String {
    let body = format!(
        r#"<p><a href="/">&larr; Back to the grid</a></p>
{}"#,
        error_notice(&format!("Could not load entry {}: {}", id, err))
    );
    layout("Error", &body)
}

pub fn render_not_found() -> String {
    let body = r#"<h1>404</h1>
<p>Nothing lives at this address. <a href="/">Back to the grid</a>.</p>"#;
    layout("Not found", body)
}
