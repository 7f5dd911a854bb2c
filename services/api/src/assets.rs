//! Static dashboard page and the scripts it loads, compiled into the binary.

pub(crate) const INDEX_HTML: &str = include_str!("../assets/index.html");

const BUNDLED: [(&str, &str); 2] = [
    ("dashboard.js", include_str!("../assets/dashboard.js")),
    ("dashboard.css", include_str!("../assets/dashboard.css")),
];

pub(crate) fn lookup(name: &str) -> Option<&'static str> {
    BUNDLED
        .iter()
        .find(|(file, _)| *file == name)
        .map(|(_, body)| *body)
}

pub(crate) fn content_type(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
