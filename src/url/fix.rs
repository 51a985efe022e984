/// Repairs a loosely-formed URL by percent-encoding unsafe characters
///
/// Gazette sites frequently hand out URLs containing spaces, parentheses,
/// or raw non-ASCII characters. This function fixes them the way a browser
/// fixes user-entered addresses, so the rest of the engine can pass URLs
/// around without caring where they came from.
///
/// # Encoding Rules
///
/// 1. The scheme and authority are left untouched
/// 2. Path: every byte outside `A-Z a-z 0-9 _ . - ~` is percent-encoded,
///    except `/` and `%` (already-encoded sequences survive)
/// 3. Query: form-encoded; spaces become `+`, and every byte outside
///    `A-Z a-z 0-9 _ . - ~ : & =` is percent-encoded (including `%`)
/// 4. The fragment is preserved as-is
/// 5. Input without a scheme is treated entirely as a path
///
/// Never fails: anything that does not look like a URL is still
/// transformed best-effort.
///
/// # Arguments
///
/// * `url` - The URL string to fix
///
/// # Returns
///
/// The fixed URL string
///
/// # Examples
///
/// ```
/// use rajpatra::url::fix_url;
///
/// let fixed = fix_url("http://egazette.example.in/wk/Elf (disambiguation)");
/// assert_eq!(fixed, "http://egazette.example.in/wk/Elf%20%28disambiguation%29");
/// ```
pub fn fix_url(url: &str) -> String {
    // Fragment first, so a '?' inside the fragment is not taken as a query
    let (before_fragment, fragment) = match url.split_once('#') {
        Some((before, frag)) => (before, Some(frag)),
        None => (url, None),
    };

    let (before_query, query) = match before_fragment.split_once('?') {
        Some((before, q)) => (before, Some(q)),
        None => (before_fragment, None),
    };

    let (head, path) = split_head(before_query);

    let mut fixed = String::with_capacity(url.len() + 8);
    fixed.push_str(head);
    quote_path_into(&mut fixed, path);

    if let Some(q) = query {
        fixed.push('?');
        quote_query_into(&mut fixed, q);
    }

    if let Some(frag) = fragment {
        fixed.push('#');
        fixed.push_str(frag);
    }

    fixed
}

/// Splits `scheme://authority/path` into the untouched head and the path
///
/// Without a `://` marker the whole string is the path.
fn split_head(s: &str) -> (&str, &str) {
    match s.find("://") {
        Some(idx) => {
            let after_scheme = idx + 3;
            match s[after_scheme..].find('/') {
                Some(slash) => s.split_at(after_scheme + slash),
                None => (s, ""),
            }
        }
        None => ("", s),
    }
}

/// Bytes that are never percent-encoded
fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'.' | b'-' | b'~')
}

/// Percent-encodes a path, keeping `/` and `%` intact
fn quote_path_into(out: &mut String, path: &str) {
    for byte in path.bytes() {
        if is_unreserved(byte) || byte == b'/' || byte == b'%' {
            out.push(byte as char);
        } else {
            push_escaped(out, byte);
        }
    }
}

/// Form-encodes a query string, keeping `:`, `&` and `=` intact
///
/// Spaces become `+`. `%` is not treated as safe here, so an
/// already-encoded query is encoded again; adapters feed raw query
/// strings, never pre-encoded ones.
fn quote_query_into(out: &mut String, query: &str) {
    for byte in query.bytes() {
        if byte == b' ' {
            out.push('+');
        } else if is_unreserved(byte) || matches!(byte, b':' | b'&' | b'=') {
            out.push(byte as char);
        } else {
            push_escaped(out, byte);
        }
    }
}

fn push_escaped(out: &mut String, byte: u8) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    out.push('%');
    out.push(HEX[(byte >> 4) as usize] as char);
    out.push(HEX[(byte & 0x0f) as usize] as char);
}
