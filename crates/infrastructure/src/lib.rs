pub mod dnsmasq;
pub mod system;
