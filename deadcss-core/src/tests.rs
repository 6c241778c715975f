//! End-to-end test suite for deadcss-core.

use crate::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn write_file(file: &Path, content: &str) {
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(file, content).unwrap();
}

fn setup_temp_project() -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir()
        .join("deadcss_tests")
        .join(format!("{}_{}", std::process::id(), id));

    if dir.exists() {
        fs::remove_dir_all(&dir).ok();
    }
    fs::create_dir_all(&dir).unwrap();
    dir
}

const SITE_CSS: &str = r#"
/* layout */
body { margin: 0 }
#header .logo { float: left }
.sidebar ul li:first-child { border: 0 }

@media print {
    .noprint { display: none }
}

a:hover, a:visited { color: red }
.tooltip { position: absolute }
p::before { content: "" }
table.data > tr { height: 1em }
"#;

const INDEX_HTML: &str = r#"<html><body>
<div id="header"><img class="logo" src="logo.png"></div>
<p>Hello <a href="/about">about</a></p>
</body></html>"#;

const APP_JS: &str = "$('.tooltip').show(); // sidebar toggle";

fn setup_site() -> PathBuf {
    let root = setup_temp_project();
    write_file(&root.join("css/site.css"), SITE_CSS);
    write_file(&root.join("templates/index.html"), INDEX_HTML);
    write_file(&root.join("js/app.js"), APP_JS);
    write_file(&root.join("node_modules/lib/print.js"), "noprint data");
    root
}

struct Collected {
    css: Vec<PathBuf>,
    html: Vec<PathBuf>,
    src: Vec<PathBuf>,
}

fn collect(root: &Path, config: &DeadcssConfig) -> Collected {
    let excludes = config.exclude_dirs();
    let excludes: Vec<&str> = excludes.iter().map(String::as_str).collect();
    let roots = [root];
    let css = collect_files_with_excludes(&roots, &ExtensionFilter::of(&[".css"]), &excludes).unwrap();
    let html = collect_files_with_excludes(
        &roots,
        &ExtensionFilter::of(&config.html_extensions()),
        &excludes,
    )
    .unwrap();
    let src = collect_files_with_excludes(
        &roots,
        &ExtensionFilter::of(&config.src_extensions()),
        &excludes,
    )
    .unwrap();
    Collected {
        css: css.into_iter().collect(),
        html: html.into_iter().collect(),
        src: src.into_iter().collect(),
    }
}

fn only_result(report: &Report) -> &AnalysisResult {
    assert_eq!(report.stylesheets.len(), 1);
    report.stylesheets.values().next().unwrap()
}

#[test]
fn test_full_pipeline_on_site() {
    let root = setup_site();
    let files = collect(&root, &DeadcssConfig::default());
    assert_eq!(files.css.len(), 1);
    assert_eq!(files.html.len(), 1);
    assert_eq!(files.src.len(), 1);

    let report = Deadcss::new()
        .with_html_files(files.html)
        .with_src_files(files.src)
        .analyze(&files.css)
        .unwrap();

    let result = only_result(&report);
    assert_eq!(result.selectors.len(), 9);
    assert_eq!(result.unused_selectors, vec![".noprint", "table.data > tr"]);
    assert!(result.warnings.is_empty());

    let dom = result.dom_matching.as_ref().unwrap();
    assert_eq!(dom.matched, 5);
    assert!(dom.failures.is_empty());

    let text = result.idclass_elimination.as_ref().unwrap();
    assert_eq!(text.possibly_used, 2);
    assert!(text.unfindable_classes.contains("noprint"));
    assert!(!text.classes.contains("logo"));
    assert!(report.has_unused());

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_dom_only_and_text_only() {
    let root = setup_site();
    let files = collect(&root, &DeadcssConfig::default());

    let dom_only = Deadcss::new().with_html_files(files.html.clone()).analyze(&files.css).unwrap();
    let result = only_result(&dom_only);
    assert!(result.idclass_elimination.is_none());
    assert_eq!(result.unused_count(), 4);

    let text_only = Deadcss::new().with_src_files(files.src.clone()).analyze(&files.css).unwrap();
    let result = only_result(&text_only);
    assert!(result.dom_matching.is_none());
    assert!(result.unused_selectors.contains(&"body".to_string()));
    assert!(!result.unused_selectors.contains(&".tooltip".to_string()));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_evidence_order_does_not_change_result() {
    let root = setup_site();
    write_file(&root.join("templates/table.html"), "<table class=\"data\"><tr><td>1</td></tr></table>");
    write_file(&root.join("js/print.js"), "window.noprint = true;");
    let files = collect(&root, &DeadcssConfig::default());

    let mut html_rev = files.html.clone();
    html_rev.reverse();
    let mut src_rev = files.src.clone();
    src_rev.reverse();

    let forward = Deadcss::new()
        .with_html_files(files.html.clone())
        .with_src_files(files.src.clone())
        .analyze(&files.css)
        .unwrap();
    let backward = Deadcss::new()
        .with_html_files(html_rev)
        .with_src_files(src_rev)
        .analyze(&files.css)
        .unwrap();

    assert_eq!(
        only_result(&forward).unused_selectors,
        only_result(&backward).unused_selectors
    );
    // the parser inserts <tbody>, so `table.data > tr` never matches
    assert_eq!(only_result(&forward).unused_selectors, vec!["table.data > tr"]);

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_stylesheets_are_analysed_independently() {
    let root = setup_temp_project();
    write_file(&root.join("a.css"), ".nav { }");
    write_file(&root.join("b.css"), ".nav { } .foo { }");
    write_file(&root.join("app.js"), "var nav;");

    let css = collect_files(&[&root], &ExtensionFilter::of(&["css"])).unwrap();
    let css: Vec<PathBuf> = css.into_iter().collect();
    let report = Deadcss::new().src_file(root.join("app.js")).analyze(&css).unwrap();

    let results: Vec<&AnalysisResult> = report.stylesheets.values().collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].unused_selectors.is_empty());
    assert_eq!(results[1].unused_selectors, vec![".foo"]);

    let summary = report.summary();
    assert_eq!(summary.selectors, 3);
    assert_eq!(summary.unused, 1);

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_unreadable_evidence_is_reported() {
    let root = setup_site();
    let files = collect(&root, &DeadcssConfig::default());
    let missing = root.join("templates/missing.html");

    let report = Deadcss::new()
        .with_html_files(files.html.clone())
        .html_file(&missing)
        .analyze(&files.css)
        .unwrap();
    let dom = only_result(&report).dom_matching.as_ref().unwrap();
    assert_eq!(dom.documents, 1);
    assert_eq!(dom.skipped_files.len(), 1);
    assert_eq!(dom.skipped_files[0].path, missing.display().to_string());

    let err = Deadcss::new()
        .with_html_files(files.html)
        .html_file(&missing)
        .fail_fast(true)
        .analyze(&files.css)
        .unwrap_err();
    assert_eq!(err.path(), Some(&missing));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_hyphenated_and_escaped_names_limitation() {
    let root = setup_temp_project();
    write_file(&root.join("site.css"), ".nav-bar { } .\\31 23 { } .menu_item { }");
    write_file(&root.join("app.js"), "var nav = 1; menu_item();");
    let css = [root.join("site.css")];

    let report = Deadcss::new().src_file(root.join("app.js")).analyze(&css).unwrap();
    let result = only_result(&report);

    // `.nav-bar` only contributes the token `nav`, which occurs as a word
    assert!(result.classes.contains("nav"));
    assert!(!result.unused_selectors.contains(&".nav-bar".to_string()));
    // `.menu_item` contributes `menu`, which does not occur on its own
    assert!(result.unused_selectors.contains(&".menu_item".to_string()));
    // escaped names yield no token at all
    assert!(result.unused_selectors.contains(&".\\31 23".to_string()));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_quoted_semicolons_and_lang_selectors() {
    let root = setup_temp_project();
    write_file(
        &root.join("site.css"),
        "@import \"base.css\";\na[href$=\";x\"] { color: red }\np:lang(de) { quotes: none }\n",
    );
    write_file(
        &root.join("index.html"),
        "<html lang=\"en\"><body><a href=\"/y;x\">y</a><p>hi</p></body></html>",
    );

    let report = Deadcss::new()
        .html_file(root.join("index.html"))
        .analyze(&[root.join("site.css")])
        .unwrap();
    let result = only_result(&report);
    assert_eq!(result.selectors.len(), 2);
    assert!(result.selectors.contains(r#"a[href$=";x"]"#));
    assert_eq!(result.unused_selectors, vec!["p:lang(de)"]);
    assert!(result.dom_matching.as_ref().unwrap().failures.is_empty());

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_malformed_css_is_best_effort() {
    let root = setup_temp_project();
    write_file(&root.join("broken.css"), "p { color: red } } div { , span { x: y } ul { /* open");
    let css = [root.join("broken.css")];

    let report = Deadcss::new().analyze(&css).unwrap();
    let result = only_result(&report);
    assert!(result.selectors.contains("p"));
    assert!(!result.warnings.is_empty());

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_json_export() {
    let root = setup_site();
    let files = collect(&root, &DeadcssConfig::default());
    let report = Deadcss::new()
        .with_html_files(files.html)
        .with_src_files(files.src)
        .analyze(&files.css)
        .unwrap();

    let path = root.join("report.json");
    report.write_json(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

    let key = files.css[0].display().to_string();
    let site = &value["stylesheets"][key.as_str()];
    assert_eq!(site["unused_selectors"], serde_json::json!([".noprint", "table.data > tr"]));
    assert_eq!(site["dom_matching"]["matched"], 5);
    assert_eq!(
        site["idclass_elimination"]["origins"][".tooltip"],
        serde_json::json!([".tooltip"])
    );

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_config_driven_discovery() {
    let root = setup_site();
    write_file(
        &root.join(config::CONFIG_FILE),
        "src_extensions = [\"txt\"]\nexclude_dirs = [\"templates\"]\n",
    );
    write_file(&root.join("notes/todo.txt"), "remember the sidebar");

    let config = load_config(&root).unwrap().unwrap();
    let files = collect(&root, &config);
    assert!(files.html.is_empty());
    assert_eq!(files.src.len(), 1);

    let report = Deadcss::from_config(&config)
        .with_src_files(files.src)
        .analyze(&files.css)
        .unwrap();
    let result = only_result(&report);
    assert!(!result.unused_selectors.contains(&".sidebar ul li:first-child".to_string()));
    assert!(result.unused_selectors.contains(&".tooltip".to_string()));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_plain_output_for_site() {
    let root = setup_site();
    let files = collect(&root, &DeadcssConfig::default());
    let report = Deadcss::new()
        .with_html_files(files.html)
        .analyze(&files.css)
        .unwrap();

    let text = render_plain(&report);
    assert!(text.contains("Could not determine usage of the following 4 CSS selectors (from 9 in total: 44.44%):"));
    assert!(text.contains("\n.tooltip\n"));

    fs::remove_dir_all(&root).ok();
}
