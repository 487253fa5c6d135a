use futures::StreamExt;
use futures::stream;
use log::trace;
use tokio::sync::mpsc;

/// Fans several receivers into one.
/// The returned receiver closes once every input has closed, immediately for no inputs.
pub fn merge<T: Send + 'static>(inputs: Vec<mpsc::Receiver<T>>) -> mpsc::Receiver<T> {
    let (tx, rx) = mpsc::channel(1);
    let streams = inputs
        .into_iter()
        .map(|mut input| stream::poll_fn(move |cx| input.poll_recv(cx)));
    let mut merged = stream::select_all(streams);

    tokio::spawn(async move {
        while let Some(item) = merged.next().await {
            if tx.send(item).await.is_err() {
                trace!("merged receiver dropped");
                break;
            }
        }
    });
    rx
}

/// A receiver that yields `value` once and then closes.
pub fn once<T: Send + 'static>(value: T) -> mpsc::Receiver<T> {
    let (tx, rx) = mpsc::channel(1);
    //capacity 1 and a fresh channel, cannot be full
    let _ = tx.try_send(value);
    rx
}
