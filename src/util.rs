//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values in one pass,
/// so inserted values are never rescanned. Unknown `{...}` is kept verbatim.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = String::with_capacity(tpl.len());
  let mut rest = tpl;
  while let Some(open) = rest.find('{') {
    out.push_str(&rest[..open]);
    let after = &rest[open + 1..];
    let hit = after.find('}').and_then(|close| {
      let key = &after[..close];
      pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| (*v, close))
    });
    match hit {
      Some((value, close)) => {
        out.push_str(value);
        rest = &after[close + 1..];
      }
      None => {
        out.push('{');
        rest = after;
      }
    }
  }
  out.push_str(rest);
  out
}

/// Log-safe truncation for large strings, on a char boundary.
/// Avoids spamming logs with huge model responses.
pub fn trunc_for_log(s: &str, max_chars: usize) -> String {
  if s.chars().count() <= max_chars {
    s.to_string()
  } else {
    let head: String = s.chars().take(max_chars).collect();
    format!("{}...", head)
  }
}

/// Case-insensitive, whitespace-trimmed key used for option comparisons.
pub fn option_key(s: &str) -> String {
  s.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_replaces_all_occurrences() {
    let out = fill_template("{a} and {a} or {b}", &[("a", "x"), ("b", "y")]);
    assert_eq!(out, "x and x or y");
  }

  #[test]
  fn fill_template_does_not_rescan_values() {
    let out = fill_template("{plot} / {title}", &[("plot", "about {title}"), ("title", "Heat")]);
    assert_eq!(out, "about {title} / Heat");
    assert_eq!(fill_template("{unknown} {{a}", &[("a", "x")]), "{unknown} {x");
  }

  #[test]
  fn trunc_respects_char_boundaries() {
    assert_eq!(trunc_for_log("héllo", 10), "héllo");
    assert_eq!(trunc_for_log("héllo", 2), "hé...");
  }
}
