use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;

/// Binds the HTTP listener. A host of `*` listens on every interface,
/// preferring an IPv6 dual-stack socket and falling back to IPv4.
pub async fn create_listener(
    host: &str,
    port: u16,
) -> std::io::Result<(String, tokio::net::TcpListener)> {
    if host == "*" {
        return create_wildcard_listener(port);
    }

    let addr = format!("{}:{}", host, port);
    tracing::info!("Attempting to bind server to {}...", addr);

    let tokio_listener = tokio::net::TcpListener::bind(&addr).await?;

    Ok((addr, tokio_listener))
}

fn create_wildcard_listener(port: u16) -> std::io::Result<(String, tokio::net::TcpListener)> {
    let ipv6_addr = SocketAddr::from((std::net::Ipv6Addr::UNSPECIFIED, port));
    tracing::info!(
        "Attempting to bind server to {}... (IPv6 + IPv4 dual-stack)",
        ipv6_addr
    );

    match bind_socket(Domain::IPV6, ipv6_addr) {
        Ok(listener) => return Ok((ipv6_addr.to_string(), listener)),
        Err(e) => tracing::warn!("Failed to bind IPv6 listener: {}. Attempting IPv4 only.", e),
    }

    let ipv4_addr = SocketAddr::from((std::net::Ipv4Addr::UNSPECIFIED, port));
    tracing::info!("Attempting to bind server to {}... (IPv4)", ipv4_addr);

    let listener = bind_socket(Domain::IPV4, ipv4_addr)?;
    Ok((ipv4_addr.to_string(), listener))
}

fn bind_socket(domain: Domain, addr: SocketAddr) -> std::io::Result<tokio::net::TcpListener> {
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    if domain == Domain::IPV6 {
        // Dual-stack is unavailable on some systems; IPv6 alone still works
        if let Err(e) = socket.set_only_v6(false) {
            tracing::warn!(
                "Failed to set dual-stack mode for IPv6 socket: {}. Continuing anyway.",
                e
            );
        }
    }

    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1024)?;
    socket.set_nonblocking(true)?;

    tokio::net::TcpListener::from_std(socket.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_named_host_on_ephemeral_port() {
        let (addr, listener) = create_listener("127.0.0.1", 0).await.unwrap();
        assert_eq!(addr, "127.0.0.1:0");
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_bind_wildcard_on_ephemeral_port() {
        let (_, listener) = create_listener("*", 0).await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_unspecified());
    }
}
