/// Owner of the station's network association (Wi-Fi on the stock board).
pub trait NetworkManager {
    /// Tear down and re-establish the connection.
    ///
    /// Called after a transient upload failure. Blocks until the driver has
    /// finished its reset sequence; whether the link is actually back up is
    /// discovered by the next upload.
    fn reset(&mut self);
}
