use rtfmark::preview::schema::{Schema, SchemaLayer};
use rtfmark::preview::{PreviewOptions, Previewer, render};
use std::collections::BTreeMap;

const EXTRAS_ON: PreviewOptions = PreviewOptions {
    enable_gfm_extras: true,
};
const EXTRAS_OFF: PreviewOptions = PreviewOptions {
    enable_gfm_extras: false,
};

const HOSTILE_INPUTS: &[&str] = &[
    "<script>alert(1)</script>",
    "before <SCRIPT src=//evil.example></SCRIPT> after",
    "<img src=x onerror=alert(1)>",
    "<body onload=\"steal()\">\n\ntext",
    "[click](javascript:alert(1))",
    "[click](JaVaScRiPt:alert(1))",
    "[click](&#106;avascript:alert(1))",
    "![img](javascript:alert(1))",
    "<a href=\"javascript:alert(1)\">x</a>",
    "| a | b |\n| --- | --- |\n| <script>x</script> | <img src=x onerror=y> |\n",
    "- [x] <script>x</script>\n- [ ] [y](javascript:z)\n",
    "~~<img src=x onload=y>~~ www.example.com/<script>",
    "> <iframe srcdoc=\"<script>x</script>\"></iframe>",
];

fn assert_safe(html: &str) {
    let lower = html.to_ascii_lowercase();
    assert!(!lower.contains("<script"), "script tag in {html}");
    assert!(!lower.contains("onerror="), "onerror in {html}");
    assert!(!lower.contains("onload="), "onload in {html}");
    assert!(!lower.contains("=\"javascript:"), "javascript uri in {html}");
    assert!(!lower.contains("<iframe"), "iframe in {html}");
}

#[test]
fn hostile_input_never_reaches_output() {
    for input in HOSTILE_INPUTS {
        assert_safe(&render(input, EXTRAS_OFF).html);
        assert_safe(&render(input, EXTRAS_ON).html);
    }
}

#[test]
fn render_is_deterministic() {
    let input = "# Title\n\n- [x] done\n\n~~old~~ www.example.com\n\n| a |\n| - |\n| 1 |\n";
    let previewer = Previewer::default();
    for options in [EXTRAS_OFF, EXTRAS_ON] {
        let first = previewer.render(input, options);
        let second = previewer.render(input, options);
        assert_eq!(first, second);
    }
}

#[test]
fn strikethrough_text_survives_without_extras() {
    let html = render("keep ~~this part~~ visible", EXTRAS_OFF).html;
    assert!(html.contains("this part"), "{html}");
    assert!(!html.contains("<del>"), "{html}");
}

#[test]
fn strikethrough_is_wrapped_with_extras() {
    let html = render("keep ~~this part~~ visible", EXTRAS_ON).html;
    assert!(html.contains("<del>this part</del>"), "{html}");
}

#[test]
fn task_state_is_hidden_without_extras() {
    let html = render("- [x] done\n- [ ] todo\n", EXTRAS_OFF).html;
    assert!(!html.contains("<input"), "{html}");
    assert!(!html.contains("checked"), "{html}");
    assert!(html.contains("done"), "{html}");
    assert!(html.contains("todo"), "{html}");
}

#[test]
fn task_state_is_shown_with_extras() {
    let html = render("- [x] done\n- [ ] todo\n", EXTRAS_ON).html;
    assert_eq!(html.matches("<input").count(), 2, "{html}");
    assert_eq!(html.matches(r#"type="checkbox""#).count(), 2, "{html}");
    assert_eq!(html.matches("checked").count(), 1, "{html}");
}

#[test]
fn bare_urls_link_only_with_extras() {
    let off = render("visit www.example.com today", EXTRAS_OFF).html;
    assert!(!off.contains("<a"), "{off}");
    assert!(off.contains("www.example.com"), "{off}");

    let on = render("visit www.example.com today", EXTRAS_ON).html;
    assert!(
        on.contains(r#"<a href="http://www.example.com">www.example.com</a>"#),
        "{on}"
    );
}

#[test]
fn pipe_table_renders_as_table() {
    let html = render("| a | b |\n| --- | :-: |\n| 1 | 2 |\n", EXTRAS_OFF).html;
    assert!(html.contains("<table>"), "{html}");
    assert!(html.contains("<tr>"), "{html}");
    assert!(html.contains("<th>a</th>"), "{html}");
    assert!(html.contains(r#"<th align="center">b</th>"#), "{html}");
    assert!(html.contains("<td>1</td>"), "{html}");
}

#[test]
fn raw_merged_cell_table_does_not_pass_through() {
    let input = "<table><tr><td colspan=\"2\" rowspan=\"3\">merged</td></tr></table>\n\n\
                 inline <td rowspan=2>cell</td> html\n";
    for options in [EXTRAS_OFF, EXTRAS_ON] {
        let html = render(input, options).html;
        assert!(!html.contains("colspan"), "{html}");
        assert!(!html.contains("rowspan"), "{html}");
        assert!(!html.contains("<table"), "{html}");
        assert!(html.contains("inline"), "{html}");
    }
}

#[test]
fn heuristic_counts_script_openers() {
    let rendered = render("<SCRIPT>a</ScRiPt>\n\n<sCrIpT>b</script>", EXTRAS_OFF);
    assert_eq!(rendered.removed_unsafe, 2);
    assert_safe(&rendered.html);

    assert_eq!(render("plain *text*", EXTRAS_OFF).removed_unsafe, 0);
}

#[test]
fn empty_input_renders_empty() {
    for options in [EXTRAS_OFF, EXTRAS_ON] {
        let rendered = render("", options);
        assert_eq!(rendered.html, "");
        assert_eq!(rendered.removed_unsafe, 0);
    }
}

#[test]
fn ordinary_markdown_keeps_its_shape() {
    let html = render(
        "# Title\n\nSome *em* and **strong** with `code`.\n\n\
         [link](https://example.com \"Example\") ![alt](https://example.com/i.png)\n\n\
         ```rust\nfn main() {}\n```\n",
        EXTRAS_OFF,
    )
    .html;
    assert!(html.contains("<h1>Title</h1>"), "{html}");
    assert!(html.contains("<em>em</em>"), "{html}");
    assert!(html.contains("<strong>strong</strong>"), "{html}");
    assert!(html.contains("<code>code</code>"), "{html}");
    assert!(html.contains(r#"href="https://example.com""#), "{html}");
    assert!(html.contains(r#"title="Example""#), "{html}");
    assert!(html.contains(r#"alt="alt""#), "{html}");
    assert!(html.contains(r#"class="language-rust""#), "{html}");
    assert!(!html.contains("rel="), "{html}");
}

#[test]
fn deeply_nested_input_is_flattened_not_fatal() {
    let input = format!("{}deep", "> ".repeat(1000));
    let html = render(&input, EXTRAS_OFF).html;
    assert!(html.contains("deep"), "{html}");
    assert!(html.matches("<blockquote>").count() <= 128);
}

#[test]
fn baseline_schema_previewer_drops_tables() {
    let previewer = Previewer::new(Schema::baseline());
    let html = previewer
        .render("| a |\n| --- |\n| 1 |\n", EXTRAS_OFF)
        .html;
    assert!(!html.contains("<table"), "{html}");
    assert!(html.contains('a'), "{html}");
    assert!(html.contains('1'), "{html}");
}

#[test]
fn operator_layer_narrows_link_attributes() {
    let layer = SchemaLayer {
        tags: Vec::new(),
        attributes: BTreeMap::from([("a".to_string(), vec!["href".to_string()])]),
    };
    let previewer = Previewer::with_layer(&layer).unwrap();
    let html = previewer
        .render("[x](https://example.com \"hover\")", EXTRAS_OFF)
        .html;
    assert!(html.contains(r#"href="https://example.com""#), "{html}");
    assert!(!html.contains("title="), "{html}");
}

#[test]
fn operator_layer_cannot_allow_script() {
    let layer = SchemaLayer {
        tags: vec!["script".to_string()],
        attributes: BTreeMap::new(),
    };
    assert!(Previewer::with_layer(&layer).is_err());
}
