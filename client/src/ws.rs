use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event as DomEvent, MessageEvent, WebSocket, Window};

use drawboard_shared::Event;

use crate::error::ClientError;
use crate::net::websocket_url;
use crate::router::Emitter;

#[derive(Debug)]
pub enum WsEvent {
    Open,
    Close,
    Error,
    Message(String),
}

/// Fire-and-forget sender. Events emitted while the socket is not open are
/// dropped, matching the relay's at-most-once delivery.
#[derive(Clone)]
pub struct WsSender {
    socket: WebSocket,
}

impl WsSender {
    pub fn is_open(&self) -> bool {
        self.socket.ready_state() == WebSocket::OPEN
    }
}

impl Emitter for WsSender {
    fn emit(&mut self, event: &Event) {
        if !self.is_open() {
            return;
        }
        match event.to_frame().and_then(|frame| frame.to_text()) {
            Ok(text) => {
                let _ = self.socket.send_with_str(&text);
            }
            Err(error) => {
                tracing::error!(%error, "WS encode failed");
            }
        }
    }
}

pub fn connect_ws(
    window: &Window,
    on_event: impl 'static + FnMut(WsEvent),
) -> Result<WsSender, ClientError> {
    let ws_url = websocket_url(window)?;
    let socket = WebSocket::new(&ws_url)?;
    let on_event = Rc::new(RefCell::new(on_event));

    {
        let on_event = on_event.clone();
        let onopen = Closure::<dyn FnMut(DomEvent)>::new(move |_| {
            on_event.borrow_mut()(WsEvent::Open);
        });
        socket.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        onopen.forget();
    }

    {
        let on_event = on_event.clone();
        let onclose = Closure::<dyn FnMut(CloseEvent)>::new(move |_| {
            on_event.borrow_mut()(WsEvent::Close);
        });
        socket.set_onclose(Some(onclose.as_ref().unchecked_ref()));
        onclose.forget();
    }

    {
        let on_event = on_event.clone();
        let onerror = Closure::<dyn FnMut(DomEvent)>::new(move |_| {
            on_event.borrow_mut()(WsEvent::Error);
        });
        socket.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();
    }

    {
        let on_event = on_event.clone();
        let onmessage = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            match event.data().as_string() {
                Some(text) => on_event.borrow_mut()(WsEvent::Message(text)),
                None => tracing::warn!(data = ?event.data(), "WS message data is not a string"),
            }
        });
        socket.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        onmessage.forget();
    }

    {
        let socket = socket.clone();
        let onbeforeunload = Closure::<dyn FnMut(DomEvent)>::new(move |_| {
            let _ = socket.close();
        });
        window.add_event_listener_with_callback(
            "beforeunload",
            onbeforeunload.as_ref().unchecked_ref(),
        )?;
        onbeforeunload.forget();
    }

    Ok(WsSender { socket })
}
