//! Example: Basic usage of Elym

use std::cell::Cell;
use std::rc::Rc;

use elym::{Dom, ElementBuilder, ElymResult};
use tracing_subscriber::EnvFilter;

fn main() -> ElymResult<()> {
    // Initialize logging (RUST_LOG=elym=trace for listener bookkeeping)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dom = Dom::parse("<html><body><main id=app></main></body></html>");
    println!("Elym v{} ready", elym::VERSION);

    // Build a menu and mount it
    let menu = ElementBuilder::new(&dom, "<ul class='menu'></ul>")?;
    let items = ["Home", "Docs", "About"];
    for label in items {
        menu.append("li").set_text(label).set_classed("item", true);
    }
    menu.append_to(ElementBuilder::select(&dom, "#app")?.root());

    // Count clicks, then drop the namespaced handler
    let clicks = Rc::new(Cell::new(0));
    let counter = clicks.clone();
    menu.select_children("li")
        .data(&items)
        .on("click.stats", move |_| counter.set(counter.get() + 1));

    for li in menu.nodes() {
        dom.dispatch(li, "click");
    }
    menu.off("click.stats");
    dom.dispatch(menu.nodes()[0], "click");
    println!("Clicks counted: {}", clicks.get());

    // Copy the menu, listeners and bound data included
    let copy = menu.back_to_root().deep_clone()?;
    copy.set_attr("id", "footer-menu").append_to(dom.body());

    println!("{}", dom.outer_html(dom.body()));
    Ok(())
}
