pub(crate) fn clamp_i32(v: i32, min: i32, max: i32) -> i32 {
    v.max(min).min(max)
}

/// `"base"`, `"base 2"`, `"base 3"`, ... the first one `taken` doesn't reject.
pub(crate) fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    let mut n: u32 = 2;
    loop {
        let candidate = format!("{} {}", base, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
