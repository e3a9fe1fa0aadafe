//! tabtree demo: walks through the tab and group operations on the console.
//!
//! Set `RUST_LOG=tabtree=debug` to watch the engine publish each change.

use std::error::Error;

use tabtree::managers::tab_manager::{TabManager, TabManagerTrait};
use tabtree::managers::tab_tree::TabTree;
use tabtree::services::session_store;
use tabtree::types::event::TabEvent;
use tabtree::types::group::{GroupColor, GroupDisposition};
use tabtree::types::ids::SequentialIdGenerator;
use tabtree::types::image::ImageHandle;
use tabtree::types::node::Node;
use tabtree::types::tab::TabSpec;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!();
    println!("tabtree v{} demo", env!("CARGO_PKG_VERSION"));
    println!();

    let mut mgr = TabManager::with_id_generator(Box::new(SequentialIdGenerator::new("demo")));
    mgr.subscribe(|snapshot, event: &TabEvent| {
        println!("  [r{}] {:?}", snapshot.revision, event);
    });

    section("Tabs");
    let docs = mgr.create_tab(TabSpec::new("Rust docs", "https://doc.rust-lang.org").selected())?;
    let crates = mgr.create_tab(TabSpec::new("crates.io", "https://crates.io"))?;
    let news = mgr.create_tab(TabSpec::new("News", "https://news.ycombinator.com"))?;
    let private = mgr.create_tab(TabSpec::new("Private", "https://example.com").incognito(true))?;
    mgr.set_favicon(&docs, Some(ImageHandle::new("image/png", vec![0x89u8, b'P', b'N', b'G'])))?;
    print_tree(mgr.tree());

    section("Groups");
    let rust = mgr.create_group("Rust", GroupColor(0xdea584), &[docs.clone(), crates.clone()])?;
    if let Err(e) = mgr.add_tab_to_group(&private, &rust, 0) {
        println!("  rejected: {}", e);
    }
    mgr.set_collapsed(&rust, true)?;
    print_tree(mgr.tree());

    section("Selection");
    mgr.select_tab(&news)?;
    let successor = mgr.tree().adjacent_tab(&news);
    mgr.close_tab(&news)?;
    if let Some(next) = successor {
        mgr.select_tab(&next)?;
    }
    print_tree(mgr.tree());

    section("Session export");
    let data = session_store::export(mgr.tree());
    let json = session_store::to_json(&data)?;
    let restored = session_store::import(session_store::from_json(&json)?)?;
    println!("  {} bytes of JSON, {} tabs restored", json.len(), restored.tab_count());

    section("Cleanup");
    mgr.delete_group(&rust, GroupDisposition::UngroupTabs)?;
    print_tree(mgr.tree());
    println!();
    Ok(())
}

fn section(name: &str) {
    println!("─── {} ───", name);
}

fn print_tree(tree: &TabTree) {
    for node in tree.nodes() {
        match node {
            Node::Tab(tab) => println!(
                "  {} {} ({}){}",
                if tab.is_selected() { "*" } else { "-" },
                tab.title,
                tab.id(),
                if tab.is_incognito() { " [incognito]" } else { "" }
            ),
            Node::Group(group) => {
                println!(
                    "  ▸ {} {} ({}, {} tabs{})",
                    group.name,
                    group.color,
                    group.id(),
                    group.len(),
                    if group.collapsed { ", collapsed" } else { "" }
                );
                for tab in group.tabs() {
                    println!(
                        "      {} {} ({})",
                        if tab.is_selected() { "*" } else { "-" },
                        tab.title,
                        tab.id()
                    );
                }
            }
        }
    }
}
