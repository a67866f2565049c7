#[cfg(test)]
mod tests {
    use rowbind_core::Connection;
    use rowbind_memory::MemoryConnection;
    use rowbind_tests::{execute_tests, init_logs};

    #[tokio::test]
    async fn memory() {
        init_logs();
        let connection = MemoryConnection::connect("memory://tests")
            .await
            .expect("Could not open the in-memory store");
        execute_tests(connection).await;
    }
}
