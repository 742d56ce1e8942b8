/// 64 random bits from two `Math::random` draws.
pub fn make_sticky_id() -> String {
    let half = || (js_sys::Math::random() * 4_294_967_296.0) as u64;
    format!("sticky-{:08x}{:08x}", half(), half())
}
