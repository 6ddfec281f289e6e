use std::process::ExitCode;

use serde::Serialize;

use nebula_search::config;
use nebula_search::controller::SearchController;
use nebula_search::group::ResultView;
use nebula_search::rank::Ranker;
use nebula_search::recent::FileStore;
use nebula_search::render;

use super::{load_config, load_index, noun, plural};
use crate::{PagesArgs, SearchArgs};

/// One result in `--json` output.
#[derive(Serialize)]
struct SearchHit<'a> {
    title: &'a str,
    path: &'a str,
    category: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    subcategory: Option<&'a str>,
    score: u32,
}

/// Run the `search` subcommand.
pub(crate) fn run_search(args: SearchArgs) -> ExitCode {
    let cli_config = match load_config() {
        Ok(c) => c,
        Err(code) => return code,
    };
    let index = match load_index(&args.index, &cli_config) {
        Ok(i) => i,
        Err(code) => return code,
    };

    let ranker = Ranker::new(cli_config.weights);
    let matches = ranker.rank_scored(&args.query, index.records());
    let view = ResultView::from_matches(&matches);

    if args.json {
        let hits: Vec<SearchHit<'_>> = view
            .iter()
            .map(|(_, entry)| SearchHit {
                title: &entry.record.title,
                path: &entry.record.path,
                category: &entry.record.category,
                subcategory: entry.record.subcategory.as_deref(),
                score: entry.score,
            })
            .collect();
        return match serde_json::to_string_pretty(&hits) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error encoding results: {e}");
                ExitCode::from(1)
            }
        };
    }

    if args.query.trim().is_empty() {
        let state_dir = config::resolve_state_dir(args.state.state_dir.as_deref(), &cli_config);
        let store = FileStore::new(state_dir);
        let controller = SearchController::new(index, ranker, Box::new(store))
            .with_quick_links(&cli_config.search.quick_links);
        print!(
            "{}",
            render::render_start(&controller.state().recent_searches, controller.quick_links())
        );
        return ExitCode::SUCCESS;
    }

    if view.is_empty() {
        print!("{}", render::render_no_results(&args.query));
        return ExitCode::SUCCESS;
    }

    println!("Found {} page{}:\n", view.len(), plural(view.len()));
    print!("{}", render::render_results(&view, None));

    ExitCode::SUCCESS
}

/// Run the `pages` subcommand.
pub(crate) fn run_pages(args: PagesArgs) -> ExitCode {
    let cli_config = match load_config() {
        Ok(c) => c,
        Err(code) => return code,
    };
    let index = match load_index(&args.index, &cli_config) {
        Ok(i) => i,
        Err(code) => return code,
    };

    if args.categories {
        let categories = index.categories();
        if categories.is_empty() {
            println!("No categories found.");
            return ExitCode::SUCCESS;
        }
        println!(
            "{} {} ({} page{}):\n",
            categories.len(),
            noun(categories.len(), "category", "categories"),
            index.len(),
            plural(index.len()),
        );
        for (name, count) in &categories {
            println!("  {name} ({count})");
        }
        return ExitCode::SUCCESS;
    }

    let pages: Vec<_> = index
        .records()
        .iter()
        .filter(|r| {
            args.category
                .as_ref()
                .is_none_or(|c| r.category.eq_ignore_ascii_case(c))
        })
        .collect();

    if pages.is_empty() {
        println!("No pages found.");
        return ExitCode::SUCCESS;
    }

    println!("{} page{}:\n", pages.len(), plural(pages.len()));
    for page in pages {
        println!("  {}  {}", page.title, page.path);
        match page.subcategory {
            Some(ref sub) => println!("    {} / {sub}", page.category),
            None => println!("    {}", page.category),
        }
        if !page.tags.is_empty() {
            println!("    tags: {}", page.tags.join(", "));
        }
    }

    ExitCode::SUCCESS
}
