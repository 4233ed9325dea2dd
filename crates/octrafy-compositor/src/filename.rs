//! Download file naming.

/// Replacement for every character outside `[a-zA-Z0-9]`.
const REPLACEMENT: char = '_';

/// Map every character of `username` outside `[a-zA-Z0-9]` to `_`.
///
/// Works per UTF-16 code unit, as a browser regex replace would: `"é"`
/// becomes one `_`, an emoji outside the BMP becomes two. Whitespace is
/// not trimmed, so leading and trailing spaces become underscores too.
#[must_use]
pub fn sanitize_username(username: &str) -> String {
    username
        .chars()
        .flat_map(|c| {
            if c.is_ascii_alphanumeric() {
                std::iter::repeat_n(c, 1)
            } else {
                std::iter::repeat_n(REPLACEMENT, c.len_utf16())
            }
        })
        .collect()
}

/// Derive the download name for `username`: the sanitized username
/// followed by `suffix`.
///
/// ```
/// use octrafy_compositor::filename::download_name;
///
/// assert_eq!(download_name("ray@0x!", "-octrafied-pfp.png"), "ray_0x_-octrafied-pfp.png");
/// ```
#[must_use]
pub fn download_name(username: &str, suffix: &str) -> String {
    let mut name = sanitize_username(username);
    name.push_str(suffix);
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUFFIX: &str = "-octrafied-pfp.png";

    #[test]
    fn alphanumeric_names_pass_through() {
        assert_eq!(download_name("alice", SUFFIX), "alice-octrafied-pfp.png");
        assert_eq!(download_name("Bob42", SUFFIX), "Bob42-octrafied-pfp.png");
    }

    #[test]
    fn punctuation_is_replaced() {
        assert_eq!(download_name("ray@0x!", SUFFIX), "ray_0x_-octrafied-pfp.png");
        assert_eq!(sanitize_username("a.b-c d"), "a_b_c_d");
    }

    #[test]
    fn bmp_letters_are_replaced_once_each() {
        assert_eq!(sanitize_username("zoë"), "zo_");
        assert_eq!(sanitize_username("日本"), "__");
    }

    #[test]
    fn astral_chars_count_as_two_units() {
        assert_eq!(sanitize_username("a😀b"), "a__b");
        assert_eq!(download_name("🦀", SUFFIX), "__-octrafied-pfp.png");
    }

    #[test]
    fn surrounding_whitespace_is_kept_as_underscores() {
        assert_eq!(sanitize_username(" al "), "_al_");
    }

    #[test]
    fn empty_username_yields_bare_suffix() {
        assert_eq!(download_name("", SUFFIX), SUFFIX);
    }
}
