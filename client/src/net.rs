use web_sys::Window;

use crate::error::ClientError;

pub fn websocket_url(window: &Window) -> Result<String, ClientError> {
    let location = window.location();
    let protocol = location.protocol()?;
    let host = location.host()?;
    Ok(format!("{}://{host}/ws", websocket_scheme(&protocol)))
}

fn websocket_scheme(protocol: &str) -> &'static str {
    if protocol == "https:" {
        "wss"
    } else {
        "ws"
    }
}
