use std::sync::Arc;

use cloudbench_instruments::{InMemoryReporter, ReportCollector};
use openstack_bench_runner::prelude::*;
use pretty_assertions::assert_eq;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn bind() -> (std::net::TcpListener, String) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    (listener, base_url)
}

/// Answers one connection per canned response, reading each request through to the end of its
/// body first.
fn serve(executor: &Executor, listener: std::net::TcpListener, responses: Vec<(u16, String)>) {
    executor.spawn(async move {
        let listener = tokio::net::TcpListener::from_std(listener).unwrap();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().await.unwrap();

            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = stream.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                let head = String::from_utf8_lossy(&buf).to_lowercase();
                if let Some(header_end) = head.find("\r\n\r\n") {
                    let content_length = head[..header_end]
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:"))
                        .map(|value| value.trim().parse::<usize>().unwrap())
                        .unwrap_or_default();
                    if buf.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {status} Fake\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        }
    });
}

fn user(base_url: &str) -> User {
    User {
        id: "u1".to_string(),
        tenant_id: "t1".to_string(),
        credential: Credential {
            auth_url: format!("{base_url}/v2.0"),
            username: "bench".to_string(),
            password: "secret".to_string(),
            tenant_name: "demo".to_string(),
            region_name: None,
            endpoint_type: EndpointType::Internal,
            insecure: false,
        },
    }
}

fn token_response(base_url: &str) -> String {
    serde_json::json!({
        "access": {
            "token": {"id": "tok-123"},
            "serviceCatalog": [{
                "type": "metering",
                "endpoints": [{"publicURL": "http://wrong:8777", "internalURL": base_url}]
            }]
        }
    })
    .to_string()
}

#[test]
fn instrumented_factory_drives_client_through_executor() {
    let executor = Arc::new(Executor::new(
        tokio::runtime::Runtime::new().unwrap(),
        ShutdownHandle::new(),
    ));
    let in_memory = InMemoryReporter::new();
    let records = in_memory.records();
    let collectors: Vec<Box<dyn ReportCollector + Send>> = vec![Box::new(in_memory)];
    let reporter = Arc::new(Reporter::new(collectors));

    let (listener, base_url) = bind();
    let created = serde_json::json!([{
        "counter_name": "cpu_util",
        "counter_type": "gauge",
        "counter_unit": "%",
        "counter_volume": 1.0,
        "resource_id": "bench_resource_abc"
    }]);
    serve(
        &executor,
        listener,
        vec![(200, token_response(&base_url)), (200, created.to_string())],
    );

    let factory = InstrumentedClientFactory::new(executor.clone(), reporter.clone());

    let mut client = factory.connect(&user(&base_url)).unwrap();
    let samples = client
        .create_sample(&NewSample {
            counter_name: "cpu_util".to_string(),
            counter_type: "gauge".to_string(),
            counter_unit: "%".to_string(),
            counter_volume: 1.0,
            resource_id: "bench_resource_abc".to_string(),
        })
        .unwrap();

    assert_eq!("bench_resource_abc", samples[0].resource_id);
    let operations = records
        .lock()
        .iter()
        .map(|r| (r.operation_id.clone(), r.is_error))
        .collect::<Vec<_>>();
    assert_eq!(
        vec![
            ("ceilometer_connect".to_string(), false),
            ("ceilometer_create_sample".to_string(), false),
        ],
        operations
    );
}
