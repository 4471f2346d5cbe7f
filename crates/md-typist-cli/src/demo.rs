/// Shown when no file is given.
pub const DEMO: &str = r#"# Streaming markdown

Text arrives a few characters at a time, the way a chat model writes it.
Styles show up *while they are being typed*, so a **bold phrase** turns bold
before its closing marker is in.

## Code

Inline code like `Vec<String>` is kept verbatim. Fenced blocks get a label:

```rust
fn main() {
    println!("hello, {}", "world");
}
```

```
no language here, so this one is plain text
```

### Odd bits

A run like ###this is not a heading, and ``two ticks`` stay as they are.
"#;
