use std::time::Duration;

use async_trait::async_trait;

/// Backoff timer. Each call must fully elapse before it returns.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Default timer: `tokio::time::sleep` natively, `setTimeout` on `wasm32`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultSleeper;

#[cfg(not(target_arch = "wasm32"))]
#[async_trait]
impl Sleeper for DefaultSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(target_arch = "wasm32")]
#[async_trait(?Send)]
impl Sleeper for DefaultSleeper {
    async fn sleep(&self, duration: Duration) {
        use wasm_bindgen::JsCast;

        let millis = duration.as_millis().min(i32::MAX as u128) as i32;
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            let global = js_sys::global();
            let set_timeout = js_sys::Reflect::get(&global, &"setTimeout".into())
                .ok()
                .and_then(|value| value.dyn_into::<js_sys::Function>().ok());
            match set_timeout {
                Some(set_timeout) => {
                    let _ = set_timeout.call2(&global, &resolve, &millis.into());
                }
                // No timer in this runtime; resolve immediately.
                None => {
                    let _ = resolve.call0(&wasm_bindgen::JsValue::UNDEFINED);
                }
            }
        });
        let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
    }
}
