//! Viewer page served at `/`
//!
//! Renders the latest `message` event as preformatted text and shrinks the
//! font until it fits the viewport. `ping` events are ignored by the
//! browser's `onmessage` handler.

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0, maximum-scale=1.0, user-scalable=no">
<title>pushview</title>
<style>
body {
    margin: 0;
    padding: 1em;
    min-height: 100vh;
    box-sizing: border-box;
    overflow-x: hidden;
    background: #1a1a1a;
    color: #fff;
    font: 16px/1.6 Consolas, "Courier New", monospace;
}
#log {
    margin: 0;
    font: inherit;
    white-space: pre-wrap;
    word-wrap: break-word;
    max-width: 100%;
}
#status {
    position: fixed;
    top: 0.4em;
    right: 0.6em;
    font-size: 11px;
    color: #777;
}
@media (max-width: 768px) {
    body { font-size: 14px; padding: 0.8em; }
}
</style>
</head>
<body>
<span id="status">connecting</span>
<pre id="log">Waiting for the server…</pre>
<script>
const log = document.getElementById('log');
const status = document.getElementById('status');

function fit() {
    log.style.fontSize = '';
    const available = window.innerHeight;
    const needed = log.scrollHeight;
    if (needed > available) {
        const size = parseFloat(getComputedStyle(log).fontSize);
        log.style.fontSize = Math.max(12, Math.floor(size * available / needed)) + 'px';
    }
}

const source = new EventSource('/stream');
source.onopen = () => { status.textContent = 'live'; };
source.onmessage = (e) => {
    log.textContent = e.data;
    fit();
};
source.onerror = () => { status.textContent = 'reconnecting'; };
window.addEventListener('resize', fit);
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_subscribes_to_stream() {
        assert!(INDEX_HTML.starts_with("<!DOCTYPE html>"));
        assert!(INDEX_HTML.contains("new EventSource('/stream')"));
    }
}
