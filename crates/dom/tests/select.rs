use anyhow::Error;
use css_selectors::{
    ElementAdapter as _, ParseErrorKind, Selector, compile, negated_selector, nth_child_selector,
    only_child_selector, type_selector,
};
use dom::Document;
use indextree::NodeId;
use rstest::rstest;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// ```text
/// <html>
///   <body>
///     <ul id=menu class="nav main">
///       "\n" <li class=item lang=en-US> <!--x--> <li class="item active"> <li lang=fr> <li> <li>
///     </ul>
///     <p class=note> "hello" </p>
///     <p/>
///     <div><span/></div>
///   </body>
/// </html>
/// ```
struct Page {
    doc: Document,
    html: NodeId,
    body: NodeId,
    menu: NodeId,
    items: Vec<NodeId>,
    note: NodeId,
    blank: NodeId,
    wrapper: NodeId,
    span: NodeId,
}

fn page() -> Result<Page, Error> {
    let mut doc = Document::new();
    let html = doc.append_element(doc.root(), "html")?;
    let body = doc.append_element(html, "body")?;

    let menu = doc.append_element(body, "ul")?;
    doc.set_attr(menu, "id", "menu")?;
    doc.set_attr(menu, "class", "nav main")?;
    doc.append_text(menu, "\n")?;
    let mut items = Vec::new();
    for index in 0..5 {
        let item = doc.append_element(menu, "li")?;
        match index {
            0 => {
                doc.set_attr(item, "class", "item")?;
                doc.set_attr(item, "lang", "en-US")?;
                doc.append_comment(menu, "x")?;
            }
            1 => doc.set_attr(item, "class", "item active")?,
            2 => doc.set_attr(item, "lang", "fr")?,
            _ => {}
        }
        items.push(item);
    }

    let note = doc.append_element(body, "p")?;
    doc.set_attr(note, "class", "note")?;
    doc.append_text(note, "hello")?;
    let blank = doc.append_element(body, "p")?;
    let wrapper = doc.append_element(body, "div")?;
    let span = doc.append_element(wrapper, "span")?;

    Ok(Page {
        doc,
        html,
        body,
        menu,
        items,
        note,
        blank,
        wrapper,
        span,
    })
}

#[test]
fn type_selector_returns_root_before_descendants() -> Result<(), Error> {
    init_logging();
    let mut doc = Document::new();
    let root = doc.append_element(doc.root(), "div")?;
    doc.append_element(root, "span")?;
    let nested = doc.append_element(root, "div")?;

    let selector = compile("div")?;
    assert_eq!(selector.match_all(&doc, root), vec![root, nested]);
    Ok(())
}

#[test]
fn div_with_span_child_matches_only_the_div() -> Result<(), Error> {
    init_logging();
    let mut doc = Document::new();
    let root = doc.append_element(doc.root(), "div")?;
    doc.append_element(root, "span")?;
    assert_eq!(compile("div")?.match_all(&doc, root), vec![root]);
    Ok(())
}

#[test]
fn empty_selector_matches_every_element() -> Result<(), Error> {
    init_logging();
    let page = page()?;
    let everything = page.doc.select("")?;
    let mut expected = vec![page.html, page.body, page.menu];
    expected.extend(&page.items);
    expected.extend([page.note, page.blank, page.wrapper, page.span]);
    assert_eq!(everything, expected);
    assert_eq!(page.doc.select("*")?, expected);
    Ok(())
}

#[rstest]
#[case("li.item", &[0, 1])]
#[case("li[class~=active]", &[1])]
#[case("[lang|=en]", &[0])]
#[case("li[lang]", &[0, 2])]
#[case("li:nth-child(odd)", &[0, 2, 4])]
#[case("li:nth-child(even)", &[1, 3])]
#[case("li:nth-child(3)", &[2])]
#[case("li:nth-last-child(2n+1)", &[0, 2, 4])]
#[case("li:nth-last-child(-n+2)", &[3, 4])]
#[case("li:first-child", &[0])]
#[case("li:last-of-type", &[4])]
#[case("li:not(.item)", &[2, 3, 4])]
#[case("li:not([lang]):not(.active)", &[3, 4])]
#[case("LI:NTH-CHILD(2N+1):NOT(:FIRST-CHILD)", &[2, 4])]
fn list_items_matching(#[case] selector: &str, #[case] expected: &[usize]) -> Result<(), Error> {
    init_logging();
    let page = page()?;
    let found = compile(selector)?.match_all(&page.doc, page.menu);
    let wanted: Vec<NodeId> = expected
        .iter()
        .filter_map(|&index| page.items.get(index).copied())
        .collect();
    assert_eq!(found, wanted);
    Ok(())
}

#[test]
fn shorthands_match_like_their_attribute_forms() -> Result<(), Error> {
    init_logging();
    let page = page()?;
    assert_eq!(page.doc.select("#menu")?, vec![page.menu]);
    assert_eq!(page.doc.select("#menu")?, page.doc.select("[id=menu]")?);
    assert_eq!(page.doc.select(".nav")?, page.doc.select("[class~=nav]")?);
    assert_eq!(page.doc.select("ul.main.nav#menu")?, vec![page.menu]);
    assert!(page.doc.select(".nav.missing")?.is_empty());
    Ok(())
}

#[test]
fn structural_pseudo_classes_on_a_page() -> Result<(), Error> {
    init_logging();
    let page = page()?;
    assert_eq!(page.doc.select(":root")?, vec![page.html]);
    assert_eq!(page.doc.select("p:empty")?, vec![page.blank]);
    assert_eq!(page.doc.select(":only-child")?, vec![page.html, page.body, page.span]);
    assert_eq!(page.doc.select("p:only-of-type")?, Vec::<NodeId>::new());
    assert_eq!(page.doc.select("ul:only-of-type")?, vec![page.menu]);
    assert_eq!(page.doc.select("p:first-of-type")?, vec![page.note]);
    assert_eq!(page.doc.select("p:nth-last-of-type(1)")?, vec![page.blank]);
    Ok(())
}

#[test]
fn select_first_is_the_first_of_select() -> Result<(), Error> {
    init_logging();
    let page = page()?;
    for selector in ["li", "p", ":empty", "span", "table"] {
        let all = page.doc.select(selector)?;
        assert_eq!(page.doc.select_first(selector)?, all.first().copied());
    }
    Ok(())
}

#[test]
fn negation_partitions_every_node() -> Result<(), Error> {
    init_logging();
    let page = page()?;
    let inner = compile("li:nth-child(2n)")?;
    let outer = negated_selector(inner.clone());
    let all_nodes = collect_all(&page.doc, page.doc.root());
    let matched = inner.filter(&page.doc, all_nodes.iter().copied());
    let unmatched = outer.filter(&page.doc, all_nodes.iter().copied());
    assert_eq!(matched.len() + unmatched.len(), all_nodes.len());
    assert!(matched.iter().all(|node| !unmatched.contains(node)));
    Ok(())
}

fn collect_all(doc: &Document, node: NodeId) -> Vec<NodeId> {
    let mut out = vec![node];
    for child in doc.children(node) {
        out.extend(collect_all(doc, child));
    }
    out
}

#[test]
fn constructors_agree_with_compiled_text() -> Result<(), Error> {
    init_logging();
    let page = page()?;
    let pairs: [(Selector, &str); 3] = [
        (nth_child_selector(2, 1, false, false), ":nth-child(odd)"),
        (only_child_selector(true), ":only-of-type"),
        (type_selector("SPAN"), "span"),
    ];
    for (built, text) in pairs {
        assert_eq!(
            built.match_all(&page.doc, page.doc.root()),
            page.doc.select(text)?
        );
    }
    Ok(())
}

#[test]
fn nodes_outside_the_search_root_still_match_directly() -> Result<(), Error> {
    init_logging();
    let page = page()?;
    let selector = compile("span:only-child")?;
    assert!(selector.match_all(&page.doc, page.menu).is_empty());
    assert!(selector.matches(&page.doc, page.span));
    assert_eq!(selector.match_all(&page.doc, page.wrapper), vec![page.span]);
    Ok(())
}

#[test]
fn removed_subtrees_disappear_from_results() -> Result<(), Error> {
    init_logging();
    let mut page = page()?;
    page.doc.remove(page.menu)?;
    assert!(page.doc.select("li")?.is_empty());
    assert_eq!(page.doc.select(":first-child")?, vec![page.html, page.body, page.note, page.span]);
    Ok(())
}

#[rstest]
#[case("div[foo", ParseErrorKind::UnexpectedEof { expected: "']'" })]
#[case("ul li", ParseErrorKind::LeftOver { remaining: 3 })]
#[case("ul>li", ParseErrorKind::LeftOver { remaining: 3 })]
#[case("p, div", ParseErrorKind::LeftOver { remaining: 5 })]
#[case(" p", ParseErrorKind::LeftOver { remaining: 2 })]
#[case("li:nth-child(n+)", ParseErrorKind::InvalidNth)]
#[case("a:hover", ParseErrorKind::UnknownPseudoClass { name: "hover".to_owned() })]
fn invalid_selectors_are_reported(#[case] selector: &str, #[case] expected: ParseErrorKind) -> Result<(), Error> {
    init_logging();
    let page = page()?;
    let err = page.doc.select(selector).err();
    assert_eq!(err.as_ref().map(|err| &err.kind), Some(&expected));
    assert_eq!(err.map(|err| err.selector), Some(selector.to_owned()));
    Ok(())
}
