//! Sample HTML templates for testing and demonstration.
//!
//! Each template exercises a different part of counter generation.

/// Report with numbered chapters and sections, figure cross-references and
/// a table of contents pointing at pages.
pub fn report_template() -> &'static str {
    r##"
<html>
<head>
    <title>Quarterly Report</title>
    <style>
        body { counter-reset: chapter figure }
        h1 { counter-increment: chapter; counter-reset: section; page-break-before: always }
        h1::before { content: "Chapter " counter(chapter, upper-roman) ": " }
        h2 { counter-increment: section }
        h2::before { content: counter(chapter) "." counter(section) " " }
        figure { counter-increment: figure }
        figcaption::before { content: "Figure " counter(figure) ". " }
        a.xref::after { content: " (figure " target-counter(attr(href), figure) ")" }
        a.toc::after { content: " ... page " target-counter(attr(href), page) }
        footer::after { content: "Page " counter(page) " of " counter(pages) }
    </style>
</head>
<body>
    <nav>
        <a class="toc" href="#overview">Overview</a>
        <a class="toc" href="#results">Results</a>
    </nav>

    <h1 id="overview">Overview</h1>
    <h2>Scope</h2>
    <p>Revenue is summarised in <a class="xref" href="#revenue">the chart</a>.</p>
    <h2>Method</h2>
    <figure id="method-diagram"><figcaption>Pipeline</figcaption></figure>

    <h1 id="results">Results</h1>
    <h2>Revenue</h2>
    <figure id="revenue"><figcaption>Revenue by quarter</figcaption></figure>
    <p>See also <a class="xref" href="#method-diagram">the method</a>.</p>

    <footer></footer>
</body>
</html>
"##
}

/// Nested ordered lists numbered with `counters()`.
pub fn nested_list_template() -> &'static str {
    r#"
<html>
<head>
    <style>
        li::marker { content: counters(list-item, ".") " " }
    </style>
</head>
<body>
    <ol>
        <li>Introduction
            <ol>
                <li>Background</li>
                <li>Goals
                    <ol>
                        <li>Short term</li>
                        <li>Long term</li>
                    </ol>
                </li>
            </ol>
        </li>
        <li>Design</li>
        <li>Conclusion</li>
    </ol>
</body>
</html>
"#
}

/// One list per numbering system.
pub fn list_styles_template() -> &'static str {
    r#"
<body>
    <ol style="list-style-type: lower-alpha"><li>a</li><li>b</li><li>c</li></ol>
    <ol style="list-style-type: upper-roman"><li>a</li><li>b</li><li>c</li><li>d</li></ol>
    <ol style="list-style-type: lower-greek"><li>a</li><li>b</li></ol>
    <ol style="list-style-type: decimal-leading-zero"><li>a</li><li>b</li></ol>
    <ol style="list-style-type: armenian"><li>a</li><li>b</li></ol>
    <ol style="list-style-type: georgian"><li>a</li><li>b</li></ol>
    <ul style="list-style-type: square"><li>a</li></ul>
    <ul style="list-style-type: circle"><li>a</li></ul>
    <ul style="list-style-type: none"><li>a</li></ul>
    <ol style="counter-reset: list-item 9"><li>ten</li><li>eleven</li></ol>
    <ol reversed><li>three</li><li>two</li><li>one</li></ol>
    <ol start="5"><li>five</li><li value="9">nine</li><li>ten</li></ol>
</body>
"#
}

/// Footnote-style references that point forward and backward.
pub fn cross_reference_template() -> &'static str {
    r##"
<html>
<head>
    <style>
        body { counter-reset: note }
        .note { counter-increment: note }
        .note::before { content: "[" counter(note) "] " }
        a.ref::after { content: "[" target-counter(attr(href), note) "]" }
        a.sec::after { content: " §" target-counters(attr(href), list-item, ".") }
        a.broken::after { content: "[" target-counter(attr(href), note) "]" }
    </style>
</head>
<body>
    <p>Forward <a class="ref" href="#n2">ref</a>.</p>
    <p class="note" id="n1">First note.</p>
    <p class="note" id="n2">Second note.</p>
    <p>Backward <a class="ref" href="#n1">ref</a>.</p>
    <ol>
        <li>One</li>
        <li>Two
            <ol><li id="deep">Deep</li></ol>
        </li>
    </ol>
    <p>Jump to <a class="sec" href="#deep">deep</a>.</p>
    <p>Dangling <a class="broken" href="#nowhere">ref</a>.</p>
</body>
</html>
"##
}

/// Simplest possible template.
pub fn minimal_template() -> &'static str {
    "<ol><li>Hello, World!</li></ol>"
}

/// Every template by name, for the CLI `--demo` flag and tests.
pub fn all_templates() -> [(&'static str, &'static str); 5] {
    [
        ("report", report_template()),
        ("nested-lists", nested_list_template()),
        ("list-styles", list_styles_template()),
        ("cross-references", cross_reference_template()),
        ("minimal", minimal_template()),
    ]
}

/// Look a template up by name.
pub fn template(name: &str) -> Option<&'static str> {
    all_templates()
        .into_iter()
        .find(|(n, _)| *n == name)
        .map(|(_, html)| html)
}
