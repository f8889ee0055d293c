//! Integration tests - builder behaviour against a live document
//!
//! Covers construction, lookup, listeners, mutation, cloning and binding
//! through the public API only.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use elym::{Dom, ElementBuilder, ElymError, Event, Listener, ListenerOptions, Namespace};

fn page() -> Dom {
    Dom::parse(
        r#"<html><body>
<div id="app"><section class="card"><p>one</p><p>two</p></section></div>
<template id="row"><tr><td>cell</td></tr></template>
<template id="empty">text only</template>
</body></html>"#,
    )
}

fn counter() -> (Rc<Cell<u32>>, impl Fn(&mut Event) + 'static) {
    let count = Rc::new(Cell::new(0));
    let c = count.clone();
    (count, move |_: &mut Event| c.set(c.get() + 1))
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

#[test]
fn test_root_matches_outermost_tag() {
    let dom = Dom::new();
    for (markup, tag) in [
        ("<div></div>", "div"),
        ("<section><p>x</p></section>", "section"),
        ("  <a href='#'>link</a>  ", "a"),
        ("<ul><li>1</li></ul><p>extra</p>", "ul"),
        ("<button type=button>Go</button>", "button"),
    ] {
        let builder = ElementBuilder::new(&dom, markup).unwrap();
        assert_eq!(dom.tag_name(builder.root()).as_deref(), Some(tag), "markup: {markup}");
        assert_eq!(builder.nodes(), vec![builder.root()]);
        assert!(ElementBuilder::is_instance(&dom, builder.root()));
    }
}

#[test]
fn test_svg_construction() {
    let dom = Dom::new();
    let svg = ElementBuilder::new(&dom, "<svg width='10'><rect width='5'/></svg>").unwrap();
    assert_eq!(dom.namespace(svg.root()), Some(Namespace::Svg));
    assert_eq!(svg.attr("width").as_deref(), Some("10"));

    let rect = svg.select_child("rect").node().unwrap();
    assert_eq!(dom.namespace(rect), Some(Namespace::Svg));
}

#[test]
fn test_construction_errors() {
    let dom = Dom::new();
    assert_eq!(
        ElementBuilder::new(&dom, "no markup here").unwrap_err(),
        ElymError::Parse("no valid element".to_string())
    );
    assert!(matches!(ElementBuilder::new(&dom, "<!-- only a comment -->"), Err(ElymError::Parse(_))));
}

// ============================================================================
// FACTORIES & INSTANCE LOOKUP
// ============================================================================

#[test]
fn test_select_and_select_all() {
    let dom = page();
    let app = ElementBuilder::select(&dom, "#app").unwrap();
    assert_eq!(dom.tag_name(app.root()).as_deref(), Some("div"));

    let ps = ElementBuilder::select_all(&dom, "section p").unwrap();
    assert_eq!(ps.nodes().len(), 2);
    assert_eq!(ps.root(), ps.nodes()[0]);

    assert!(matches!(ElementBuilder::select(&dom, "#missing"), Err(ElymError::NotFound(_))));
    assert!(matches!(
        ElementBuilder::select_all(&dom, "article"),
        Err(ElymError::InvalidArgument(_))
    ));
}

#[test]
fn test_from_element_requires_nodes() {
    let dom = page();
    assert!(matches!(
        ElementBuilder::from_element(&dom, &[]),
        Err(ElymError::InvalidArgument(_))
    ));
}

#[test]
fn test_rewrapping_overwrites_registration() {
    let dom = page();
    let first = ElementBuilder::select(&dom, ".card").unwrap();
    let second = ElementBuilder::select(&dom, ".card").unwrap();
    let owner = ElementBuilder::get_instance(&dom, first.root()).unwrap();
    assert_eq!(owner, second);
    assert_ne!(owner, first);
}

#[test]
fn test_instance_outlives_dropped_handle() {
    let dom = Dom::new();
    let (count, callback) = counter();
    {
        ElementBuilder::new(&dom, "<button id=x></button>")
            .unwrap()
            .on("click.ns", callback)
            .append_to(dom.body());
    }
    let button = ElementBuilder::get_instance_by_selector(&dom, "#x").unwrap();
    assert_eq!(button.listener_keys(button.root()), ["click.ns"]);
    dom.dispatch(button.root(), "click");
    assert_eq!(count.get(), 1);

    button.off("click.ns");
    dom.dispatch(button.root(), "click");
    assert_eq!(count.get(), 1);
}

#[test]
fn test_displaced_instance_nobody_holds_is_evicted() {
    let dom = Dom::new();
    let host = ElementBuilder::new(&dom, "<div></div>").unwrap();
    let child = host.append("span").root();
    assert!(ElementBuilder::is_instance(&dom, child));

    host.set_text("replaced");
    assert!(!dom.is_live(child));
    assert!(!ElementBuilder::is_instance(&dom, child));
}

#[test]
fn test_instance_by_selector() {
    let dom = page();
    assert!(!ElementBuilder::is_instance_by_selector(&dom, "#app"));
    let app = ElementBuilder::select(&dom, "#app").unwrap();
    assert!(ElementBuilder::is_instance_by_selector(&dom, "#app"));
    assert_eq!(ElementBuilder::get_instance_by_selector(&dom, "div#app"), Some(app));
    assert!(ElementBuilder::get_instance_by_selector(&dom, "#nope").is_none());
    assert!(!ElementBuilder::is_instance_by_selector(&dom, "[[bad"));
}

#[test]
fn test_create_from_template() {
    let dom = page();
    let row = ElementBuilder::create_from_template(&dom, "#row").unwrap();
    assert_eq!(dom.tag_name(row.root()).as_deref(), Some("tr"));
    assert_eq!(row.text(), "cell");
    assert_eq!(dom.parent(row.root()), None);

    assert!(matches!(
        ElementBuilder::create_from_template(&dom, "#empty"),
        Err(ElymError::Parse(_))
    ));
    assert!(matches!(
        ElementBuilder::create_from_template(&dom, "#nope"),
        Err(ElymError::NotFound(_))
    ));
}

// ============================================================================
// SELECTION
// ============================================================================

#[test]
fn test_select_child_miss_keeps_selection() {
    let dom = page();
    let app = ElementBuilder::select(&dom, "#app").unwrap();
    app.select_children("p");
    let selected = app.nodes();
    assert_eq!(selected.len(), 2);

    app.select_child("table").select_children("em");
    assert_eq!(app.nodes(), selected);

    app.back_to_root();
    assert_eq!(app.nodes(), vec![app.root()]);
}

#[test]
fn test_selection_is_scoped_to_root() {
    let dom = page();
    let card = ElementBuilder::select(&dom, ".card").unwrap();
    // #app is an ancestor, not a descendant
    card.select_child("#app");
    assert_eq!(card.nodes(), vec![card.root()]);
}

#[test]
fn test_each_and_call() {
    let dom = page();
    let app = ElementBuilder::select(&dom, "#app").unwrap();
    let mut seen = Vec::new();
    app.select_children("p")
        .each(|node, index| seen.push((node, index)))
        .call(|builder| {
            builder.set_attr("data-seen", "1");
        });
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].1, 1);
    assert_eq!(dom.query_selector_all("[data-seen]").len(), 2);
}

// ============================================================================
// ACCESSORS
// ============================================================================

#[test]
fn test_attr_round_trip_over_selection() {
    let dom = page();
    let ps = ElementBuilder::select_all(&dom, "p").unwrap();
    ps.set_attr("title", "hello");
    assert_eq!(ps.attr("title").as_deref(), Some("hello"));
    for p in ps.nodes() {
        assert_eq!(ElementBuilder::from_node(&dom, p).attr("title").as_deref(), Some("hello"));
    }
}

#[test]
fn test_inner_markup_round_trip() {
    let dom = Dom::new();
    let div = ElementBuilder::new(&dom, "<div></div>").unwrap();
    div.set_html("<em>a</em><br>b");
    assert_eq!(div.html(), "<em>a</em><br>b");
    assert_eq!(div.property("textContent").unwrap().to_string(), "ab");
    assert_eq!(
        div.property("outerHTML").unwrap().to_string(),
        "<div><em>a</em><br>b</div>"
    );
}

#[test]
fn test_set_html_parses_in_element_context() {
    let dom = page();
    let table = ElementBuilder::new(&dom, "<table></table>").unwrap();
    table.append_to(dom.body()).set_html("<tr><td>x</td></tr>");
    assert_eq!(dom.query_selector_all("table tbody tr td").len(), 1);
    assert_eq!(table.text(), "x");

    let row = ElementBuilder::new(&dom, "<tr><td>1</td></tr>").unwrap();
    assert_eq!(dom.tag_name(row.root()).as_deref(), Some("tr"));
    row.append_to(dom.query_selector("tbody").unwrap());
    assert_eq!(dom.query_selector_all("table tr").len(), 2);
}

#[test]
fn test_set_text_keeps_registered_children() {
    let dom = Dom::new();
    let div = ElementBuilder::new(&dom, "<div></div>").unwrap();
    let child = div.append("span");
    child.set_text("inner");
    div.set_text("replaced");

    // Still owned by a live builder, so only detached
    assert!(dom.is_live(child.root()));
    assert_eq!(dom.parent(child.root()), None);
    assert_eq!(child.text(), "inner");
}

// ============================================================================
// EVENT LISTENERS
// ============================================================================

#[test]
fn test_off_bare_type_keeps_namespaced() {
    let dom = Dom::new();
    let button = ElementBuilder::new(&dom, "<button></button>").unwrap();
    let (count, callback) = counter();
    button.on("click.ns", callback);

    button.off("click");
    dom.dispatch(button.root(), "click");
    assert_eq!(count.get(), 1);

    button.off("click.ns");
    dom.dispatch(button.root(), "click");
    assert_eq!(count.get(), 1);
    assert!(button.listener_keys(button.root()).is_empty());
}

#[test]
fn test_off_bare_type_removes_plain() {
    let dom = Dom::new();
    let button = ElementBuilder::new(&dom, "<button></button>").unwrap();
    let (plain, a) = counter();
    let (namespaced, b) = counter();
    button.on("click", a).on("click.menu", b);

    button.off("click");
    dom.dispatch(button.root(), "click");
    assert_eq!((plain.get(), namespaced.get()), (0, 1));
    assert_eq!(button.listener_keys(button.root()), ["click.menu"]);
}

#[test]
fn test_namespace_matches_by_pattern() {
    let dom = Dom::new();
    let button = ElementBuilder::new(&dom, "<button></button>").unwrap();
    let (count, callback) = counter();
    let listener = Listener::new(callback);
    let options = ListenerOptions::default();
    button
        .on_with("click.ui.menu", listener.clone(), options)
        .on_with("click.menu", listener.clone(), options)
        .on_with("click.menux", listener, options);

    button.off("click.menu");
    assert_eq!(button.listener_keys(button.root()), ["click.menux"]);
    // The shared callback is still attached through the remaining key
    dom.dispatch(button.root(), "click");
    assert_eq!(count.get(), 1);
}

#[test]
fn test_shared_listener_stays_until_last_key_goes() {
    let dom = Dom::new();
    let button = ElementBuilder::new(&dom, "<button></button>").unwrap();
    let (count, callback) = counter();
    let listener = Listener::new(callback);
    button
        .on_with("click", listener.clone(), ListenerOptions::default())
        .on_with("click.a", listener, ListenerOptions::default());

    // Native registration deduplicates, so one dispatch fires once
    dom.dispatch(button.root(), "click");
    assert_eq!(count.get(), 1);

    button.off("click");
    dom.dispatch(button.root(), "click");
    assert_eq!(count.get(), 2);

    button.off("click.a");
    dom.dispatch(button.root(), "click");
    assert_eq!(count.get(), 2);
}

#[test]
fn test_listeners_accumulate_in_order() {
    let dom = Dom::new();
    let div = ElementBuilder::new(&dom, "<div></div>").unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));
    for label in ["first", "second", "third"] {
        let log = log.clone();
        div.on("focus", move |_| log.borrow_mut().push(label));
    }
    dom.dispatch(div.root(), "focus");
    assert_eq!(*log.borrow(), ["first", "second", "third"]);
    assert_eq!(div.listeners(div.root(), "focus").len(), 3);
}

#[test]
fn test_bubbling_and_capture() {
    let dom = page();
    let app = ElementBuilder::select(&dom, "#app").unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));
    let l = log.clone();
    app.on("click", move |_| l.borrow_mut().push("bubble"));
    let l = log.clone();
    app.on_with(
        "click",
        Listener::new(move |_| l.borrow_mut().push("capture")),
        ListenerOptions::capture(),
    );
    let l = log.clone();
    app.select_child("p").on("click", move |event| {
        l.borrow_mut().push("target");
        event.prevent_default();
    });

    let p = app.node().unwrap();
    assert!(!dom.dispatch(p, "click"));
    assert_eq!(*log.borrow(), ["capture", "target", "bubble"]);
}

#[test]
fn test_listener_may_mutate_builder() {
    let dom = Dom::new();
    let div = ElementBuilder::new(&dom, "<div></div>").unwrap();
    let handle = div.clone();
    div.on("click", move |_| {
        handle.set_classed("clicked", true).off("click");
    });
    dom.dispatch(div.root(), "click");
    dom.dispatch(div.root(), "click");
    assert!(div.classed("clicked"));
    assert!(div.listener_keys(div.root()).is_empty());
}

// ============================================================================
// MUTATION
// ============================================================================

#[test]
fn test_append_over_two_nodes() {
    let dom = page();
    let ps = ElementBuilder::select_all(&dom, "p").unwrap();
    let spans = ps.append("span");

    assert_ne!(spans, ps);
    assert_eq!(spans.nodes().len(), 2);
    for (span, p) in spans.nodes().into_iter().zip(ps.nodes()) {
        assert_eq!(dom.tag_name(span).as_deref(), Some("span"));
        assert_eq!(dom.parent(span), Some(p));
        assert_eq!(ElementBuilder::get_instance(&dom, span), Some(spans.clone()));
    }
}

#[test]
fn test_append_elements_all_to_all() {
    let dom = Dom::new();
    let a = ElementBuilder::new(&dom, "<div id=a></div>").unwrap();
    let b = ElementBuilder::new(&dom, "<div id=b></div>").unwrap();
    let parents = ElementBuilder::from_element(&dom, &[a.root(), b.root()]).unwrap();

    let em = ElementBuilder::new(&dom, "<em></em>").unwrap();
    let strong = ElementBuilder::new(&dom, "<strong></strong>").unwrap();
    parents.append_elements([elym::Target::from(&em), strong.root().into()]);

    // Each item can only live under one parent: the last one wins
    assert!(dom.children(a.root()).is_empty());
    assert_eq!(dom.children(b.root()), vec![em.root(), strong.root()]);
}

#[test]
fn test_append_children_copies_per_target() {
    let dom = Dom::new();
    let a = ElementBuilder::new(&dom, "<div></div>").unwrap();
    let b = ElementBuilder::new(&dom, "<div></div>").unwrap();
    let item = ElementBuilder::new(&dom, "<i>x</i>").unwrap();
    ElementBuilder::from_element(&dom, &[a.root(), b.root()])
        .unwrap()
        .append_children(&[item.root()]);

    assert_eq!(a.html(), "<i>x</i>");
    assert_eq!(b.html(), "<i>x</i>");
    assert_eq!(dom.parent(item.root()), None);
}

#[test]
fn test_append_child_moves() {
    let dom = Dom::new();
    let list = ElementBuilder::new(&dom, "<ol></ol>").unwrap();
    let li = ElementBuilder::new(&dom, "<li></li>").unwrap();
    list.append_child(li.root());
    assert_eq!(dom.parent(li.root()), Some(list.root()));
}

#[test]
fn test_remove_detaches_and_deregisters() {
    let dom = page();
    let card = ElementBuilder::select(&dom, ".card").unwrap();
    let app = dom.query_selector("#app").unwrap();
    let root = card.root();
    let (count, callback) = counter();
    card.on("click", callback).data(&["bound"]);

    assert!(dom.contains(app, root));
    card.remove();

    assert!(!dom.contains(app, root));
    assert!(ElementBuilder::get_instance(&dom, root).is_none());
    assert!(!card.has_data(root));
    assert!(card.listener_keys(root).is_empty());
    assert!(dom.query_selector("section p").is_none());
    dom.dispatch(root, "click");
    assert_eq!(count.get(), 0);
}

#[test]
fn test_remove_keeps_held_descendant_builders() {
    let dom = page();
    let card = ElementBuilder::select(&dom, ".card").unwrap();
    let p = ElementBuilder::select(&dom, "p").unwrap();
    let (count, callback) = counter();
    p.on("click", callback);

    card.remove();
    assert!(dom.is_live(p.root()));
    assert_eq!(p.listener_keys(p.root()), ["click"]);
    assert_eq!(ElementBuilder::get_instance(&dom, p.root()), Some(p.clone()));
    assert!(!ElementBuilder::is_instance(&dom, card.root()));

    p.append_to(dom.body());
    assert_eq!(dom.parent(p.root()), Some(dom.body()));
    dom.dispatch(p.root(), "click");
    assert_eq!(count.get(), 1);
}

#[test]
fn test_remove_frees_subtrees_nobody_holds() {
    let dom = page();
    let p_node = {
        let p = ElementBuilder::select(&dom, "p").unwrap();
        p.on("click.x", |_| {});
        p.root()
    };
    assert!(ElementBuilder::is_instance(&dom, p_node));

    ElementBuilder::select(&dom, ".card").unwrap().remove();
    assert!(!dom.is_live(p_node));
    assert!(!ElementBuilder::is_instance(&dom, p_node));
    assert_eq!(dom.registry_len(), 0);
}

// ============================================================================
// CLONING & DATA
// ============================================================================

#[test]
fn test_clone_reproduces_markup_and_listener() {
    let dom = Dom::new();
    let original = ElementBuilder::new(&dom, "<div class='box'><b>hi</b></div>").unwrap();
    let (count, callback) = counter();
    original.on("click.ns", callback).data(&[7]);

    let copy = original.deep_clone().unwrap();
    assert_ne!(copy.root(), original.root());
    assert_eq!(dom.outer_html(copy.root()), dom.outer_html(original.root()));
    assert!(ElementBuilder::get_instance(&dom, copy.root()) == Some(copy.clone()));

    dom.dispatch(copy.root(), "click");
    assert_eq!(count.get(), 1);
    assert_eq!(
        copy.listeners(copy.root(), "click.ns"),
        original.listeners(original.root(), "click.ns")
    );
    assert_eq!(copy.listener_keys(copy.root()), ["click.ns"]);
    assert_eq!(copy.get_data::<i32>(copy.root()).as_deref(), Some(&7));

    // The copy's bookkeeping is its own
    copy.off("click.ns");
    dom.dispatch(original.root(), "click");
    assert_eq!(count.get(), 2);
}

#[test]
fn test_data_zip_shortest() {
    let dom = Dom::new();
    let ul = ElementBuilder::new(&dom, "<ul><li></li><li></li><li></li></ul>").unwrap();
    let mut calls = Vec::new();
    ul.select_children("li")
        .data_with(&["a", "b"], |_, value, index| calls.push((index, *value)));

    assert_eq!(calls, [(0, "a"), (1, "b")]);
    let nodes = ul.nodes();
    assert_eq!(ul.get_data::<&str>(nodes[0]).as_deref(), Some(&"a"));
    assert_eq!(ul.get_data::<&str>(nodes[1]).as_deref(), Some(&"b"));
    assert!(ul.get_data::<&str>(nodes[2]).is_none());
}

#[test]
fn test_config_url() {
    let config = elym::Config {
        url: "https://example.test/".to_string(),
        ..Default::default()
    };
    let dom = Dom::with_config(config);
    assert_eq!(dom.document().url(), "https://example.test/");
    assert!(dom.body().is_valid());
}

#[test]
fn test_foreign_builder_target_is_ignored() {
    let dom = Dom::new();
    let other = Dom::new();
    let div = ElementBuilder::new(&dom, "<div></div>").unwrap();
    let foreign = ElementBuilder::new(&other, "<span></span>").unwrap();
    div.append_elements([&foreign]);
    assert!(dom.children(div.root()).is_empty());
}
