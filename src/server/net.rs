//! Local address discovery

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Address of the interface used for outbound traffic
///
/// Connecting a UDP socket only selects a route; no packet is sent. Falls back
/// to loopback when the host has no route.
pub fn local_ip() -> IpAddr {
    probe().unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

fn probe() -> std::io::Result<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.connect((Ipv4Addr::new(8, 8, 8, 8), 80))?;
    Ok(socket.local_addr()?.ip())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_ip_is_usable() {
        let ip = local_ip();
        assert!(!ip.is_unspecified());
        assert!(!ip.is_multicast());
    }
}
