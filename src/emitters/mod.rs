//! Target-dialect emitters. PCRE2 is the reference dialect.

pub mod pcre2;
