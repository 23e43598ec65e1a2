//! Network interface name classification and `/sys/class/net` queries

use std::path::PathBuf;

use crate::config::SysPaths;
use crate::error::{InterfaceError, NetworkError, SystemError};
use crate::sysfs::{FileSystem, HostFileSystem};
use crate::Result;

/// `/sys/class/net/<ifname>/carrier` tells if the interface is plugged
const CARRIER: &str = "carrier";
/// `/sys/class/net/<ifname>/device` tells if the interface is physical
const DEVICE: &str = "device";
/// `/sys/class/net/<ifname>/flags` holds the interface flags, in hexadecimal
const FLAGS: &str = "flags";
/// `/sys/class/net/<ifname>/address` holds the hardware address
const HWADDRESS: &str = "address";
/// `/sys/class/net/<ifname>/type` holds the hardware type id
const HWTYPE: &str = "type";
/// `/sys/class/net/<ifname>/mtu` holds the MTU
const MTU: &str = "mtu";

/// True if `name` is not a tagged VLAN (contains no `.`)
pub fn is_physical(name: &str) -> bool {
    !name.contains('.')
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// True if `name` is `vlan<N>` or `<base>.<N>`
pub fn is_vlan_name(name: &str) -> bool {
    if name.strip_prefix("vlan").is_some_and(is_digits) {
        return true;
    }
    match name.find('.') {
        Some(pos) if pos > 0 => is_digits(&name[pos + 1..]),
        _ => false,
    }
}

/// True if `name` is `<base>:<N>`
pub fn is_alias_name(name: &str) -> bool {
    match name.find(':') {
        Some(pos) if pos > 0 => is_digits(&name[pos + 1..]),
        _ => false,
    }
}

/// Physical interface part of an alias name: `eth0:1` gives `eth0`
pub fn physical_name_from_alias(name: &str) -> Result<&str> {
    if !is_alias_name(name) {
        return Err(InterfaceError::NotAnAlias {
            name: name.to_string(),
        }
        .into());
    }

    Ok(name.split_once(':').map_or(name, |(base, _)| base))
}

/// True if `name` looks like a physical ethernet interface (`eth*`, `en*`)
pub fn is_ethernet_physical(name: &str) -> bool {
    (name.starts_with("eth") || name.starts_with("en"))
        && !is_alias_name(name)
        && is_physical(name)
}

/// Interface queries against the live kernel views
#[derive(Debug, Clone)]
pub struct NetDevices<F: FileSystem = HostFileSystem> {
    pub(crate) fs: F,
    pub(crate) paths: SysPaths,
}

impl NetDevices<HostFileSystem> {
    /// Queries against the host's `/sys/class/net` and `/proc/net/vlan`
    pub fn host() -> Self {
        Self::new(HostFileSystem, SysPaths::default())
    }
}

impl<F: FileSystem> NetDevices<F> {
    pub fn new(fs: F, paths: SysPaths) -> Self {
        Self { fs, paths }
    }

    pub fn paths(&self) -> &SysPaths {
        &self.paths
    }

    fn interface_path(&self, name: &str) -> PathBuf {
        self.paths.sys_class_net.join(name)
    }

    fn attribute_path(&self, name: &str, attribute: &str) -> PathBuf {
        self.interface_path(name).join(attribute)
    }

    /// True if the kernel has registered an interface called `name`
    pub fn is_registered(&self, name: &str) -> bool {
        self.fs.is_dir(&self.interface_path(name))
    }

    /// True if `name` is physical and backed by a hardware device
    pub fn has_device_directory(&self, name: &str) -> bool {
        is_physical(name) && self.fs.is_dir(&self.attribute_path(name, DEVICE))
    }

    /// All registered interfaces, unfiltered
    pub fn list_registered(&self) -> Result<Vec<String>> {
        let entries = self.fs.list_dir(&self.paths.sys_class_net)?;
        Ok(entries
            .into_iter()
            .filter(|name| self.is_registered(name))
            .collect())
    }

    /// Registered interfaces accepted by `filter`
    pub fn list_filtered<P>(&self, filter: P) -> Result<Vec<String>>
    where
        P: Fn(&str) -> bool,
    {
        Ok(self
            .list_registered()?
            .into_iter()
            .filter(|name| filter(name))
            .collect())
    }

    /// Registered, non-VLAN interfaces accepted by `filter`
    pub fn list_physical<P>(&self, filter: P) -> Result<Vec<String>>
    where
        P: Fn(&str) -> bool,
    {
        self.list_filtered(|name| filter(name) && is_physical(name))
    }

    /// True if `name` is registered and named like a dummy interface
    ///
    /// A dummy interface can be renamed, so this is only a heuristic.
    pub fn is_dummy(&self, name: &str) -> bool {
        self.is_registered(name) && name.starts_with("dummy")
    }

    /// True if the link is detected; only meaningful for physical interfaces
    pub fn is_carrier_present(&self, name: &str) -> bool {
        match self.read_attribute(name, CARRIER) {
            Ok(value) => value.parse::<i64>().map_or(false, |carrier| carrier != 0),
            Err(e) => {
                log::debug!("No carrier information for {}: {}", name, e);
                false
            }
        }
    }

    /// Interface flags (`IFF_*` bits)
    pub fn flags(&self, name: &str) -> Result<u32> {
        let value = self.read_attribute(name, FLAGS)?;
        let digits = value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
            .unwrap_or(&value);
        u32::from_str_radix(digits, 16).map_err(|_| self.invalid_value(name, FLAGS, &value))
    }

    /// Hardware address, as reported by the kernel
    pub fn hw_address(&self, name: &str) -> Result<String> {
        self.read_attribute(name, HWADDRESS)
    }

    /// Hardware type id (`ARPHRD_*`)
    pub fn hw_type(&self, name: &str) -> Result<u32> {
        self.read_decimal(name, HWTYPE)
    }

    pub fn mtu(&self, name: &str) -> Result<u32> {
        self.read_decimal(name, MTU)
    }

    fn read_decimal(&self, name: &str, attribute: &str) -> Result<u32> {
        let value = self.read_attribute(name, attribute)?;
        value
            .parse()
            .map_err(|_| self.invalid_value(name, attribute, &value))
    }

    /// Read the trimmed single-line content of an interface attribute
    fn read_attribute(&self, name: &str, attribute: &str) -> Result<String> {
        let path = self.attribute_path(name, attribute);
        match self.fs.read_to_string(&path) {
            Ok(content) => Ok(content.trim().to_string()),
            Err(source) => Err(SystemError::FileRead { path, source }.into()),
        }
    }

    fn invalid_value(&self, name: &str, attribute: &str, value: &str) -> NetworkError {
        SystemError::InvalidValue {
            path: self.attribute_path(name, attribute),
            value: value.to_string(),
        }
        .into()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sysfs::MockFileSystem;
    use std::fs;
    use std::io;
    use std::path::Path;
    use tempfile::TempDir;

    /// Fake `/sys` + `/proc` tree under a temporary directory
    pub(crate) struct FakeHost {
        pub temp_dir: TempDir,
        pub paths: SysPaths,
    }

    impl FakeHost {
        pub fn new() -> Self {
            let temp_dir = TempDir::new().unwrap();
            let paths = SysPaths::with_root(temp_dir.path());
            fs::create_dir_all(&paths.sys_class_net).unwrap();
            Self { temp_dir, paths }
        }

        pub fn add_interface(&self, name: &str) -> &Self {
            fs::create_dir_all(self.paths.sys_class_net.join(name)).unwrap();
            self
        }

        pub fn add_device(&self, name: &str) -> &Self {
            fs::create_dir_all(self.paths.sys_class_net.join(name).join(DEVICE)).unwrap();
            self
        }

        pub fn set_attribute(&self, name: &str, attribute: &str, value: &str) -> &Self {
            self.add_interface(name);
            fs::write(self.paths.sys_class_net.join(name).join(attribute), value).unwrap();
            self
        }

        pub fn add_vlan(&self, name: &str) -> &Self {
            self.add_interface(name);
            fs::create_dir_all(&self.paths.proc_net_vlan).unwrap();
            fs::write(self.paths.proc_net_vlan.join(name), "").unwrap();
            self
        }

        pub fn write_vlan_config(&self, content: &str) -> &Self {
            fs::create_dir_all(&self.paths.proc_net_vlan).unwrap();
            fs::write(self.paths.proc_net_vlan.join("config"), content).unwrap();
            self
        }

        pub fn devices(&self) -> NetDevices {
            NetDevices::new(HostFileSystem, self.paths.clone())
        }
    }

    #[test]
    fn test_name_predicates() {
        assert!(is_physical("eth0"));
        assert!(!is_physical("eth0.100"));

        assert!(is_vlan_name("vlan7"));
        assert!(is_vlan_name("eth0.100"));
        assert!(is_vlan_name("br-lan.5"));
        assert!(!is_vlan_name("eth0"));
        assert!(!is_vlan_name("vlan"));
        assert!(!is_vlan_name("eth0."));
        assert!(!is_vlan_name(".100"));
        assert!(!is_vlan_name("eth0.abc"));
        assert!(!is_vlan_name("eth0.1.2"));
        // A non-numeric `vlan` suffix falls back to the dotted form
        assert!(is_vlan_name("vlanfoo.5"));
        assert!(!is_vlan_name("vlanfoo"));
        assert!(!is_vlan_name("vlan5x"));

        assert!(is_alias_name("eth0:1"));
        assert!(!is_alias_name("eth0"));
        assert!(!is_alias_name(":1"));
        assert!(!is_alias_name("eth0:"));
        assert!(!is_alias_name("eth0:a"));
    }

    #[test]
    fn test_physical_name_from_alias() {
        assert_eq!(physical_name_from_alias("eth0:1").unwrap(), "eth0");
        assert_eq!(physical_name_from_alias("eth0.100:12").unwrap(), "eth0.100");

        let err = physical_name_from_alias("eth0").unwrap_err();
        assert!(matches!(
            err,
            NetworkError::Interface(InterfaceError::NotAnAlias { .. })
        ));
    }

    #[test]
    fn test_is_ethernet_physical() {
        assert!(is_ethernet_physical("eth0"));
        assert!(is_ethernet_physical("enp3s0"));
        assert!(!is_ethernet_physical("eth0:1"));
        assert!(!is_ethernet_physical("eth0.100"));
        assert!(!is_ethernet_physical("wlan0"));
        assert!(!is_ethernet_physical("lo"));
    }

    #[test]
    fn test_registered_and_physical_listing() {
        let host = FakeHost::new();
        host.add_interface("lo")
            .add_interface("eth0")
            .add_device("eth0")
            .add_interface("eth0.100")
            .add_interface("dummy0");
        fs::write(host.paths.sys_class_net.join("bonding_masters"), "").unwrap();

        let devices = host.devices();
        let mut registered = devices.list_registered().unwrap();
        registered.sort();
        assert_eq!(registered, vec!["dummy0", "eth0", "eth0.100", "lo"]);

        let mut physical = devices.list_physical(|_| true).unwrap();
        physical.sort();
        assert_eq!(physical, vec!["dummy0", "eth0", "lo"]);

        let ethernet = devices.list_physical(is_ethernet_physical).unwrap();
        assert_eq!(ethernet, vec!["eth0"]);

        assert!(devices.is_registered("eth0"));
        assert!(!devices.is_registered("bonding_masters"));
        assert!(devices.has_device_directory("eth0"));
        assert!(!devices.has_device_directory("lo"));
        assert!(devices.is_dummy("dummy0"));
        assert!(!devices.is_dummy("dummy9"));
    }

    #[test]
    fn test_attributes() {
        let host = FakeHost::new();
        host.set_attribute("eth0", FLAGS, "0x1003\n")
            .set_attribute("eth0", HWADDRESS, "52:54:00:12:34:56\n")
            .set_attribute("eth0", HWTYPE, "1\n")
            .set_attribute("eth0", MTU, "1500\n")
            .set_attribute("eth0", CARRIER, "1\n")
            .set_attribute("eth1", CARRIER, "0\n")
            .set_attribute("eth2", MTU, "jumbo\n");

        let devices = host.devices();
        assert_eq!(devices.flags("eth0").unwrap(), 0x1003);
        assert_eq!(devices.hw_address("eth0").unwrap(), "52:54:00:12:34:56");
        assert_eq!(devices.hw_type("eth0").unwrap(), 1);
        assert_eq!(devices.mtu("eth0").unwrap(), 1500);

        assert!(devices.is_carrier_present("eth0"));
        assert!(!devices.is_carrier_present("eth1"));
        assert!(!devices.is_carrier_present("missing0"));

        assert!(matches!(
            devices.mtu("missing0").unwrap_err(),
            NetworkError::System(SystemError::FileRead { .. })
        ));
        assert!(matches!(
            devices.mtu("eth2").unwrap_err(),
            NetworkError::System(SystemError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_unreadable_carrier_with_mock() {
        let mut fs = MockFileSystem::new();
        fs.expect_read_to_string()
            .withf(|path: &Path| path.ends_with("eth0/carrier"))
            .returning(|_| Err(io::Error::from(io::ErrorKind::InvalidInput)));

        let devices = NetDevices::new(fs, SysPaths::default());
        assert!(!devices.is_carrier_present("eth0"));
    }

    #[test]
    fn test_missing_sys_class_net() {
        let temp_dir = TempDir::new().unwrap();
        let devices = NetDevices::new(HostFileSystem, SysPaths::with_root(temp_dir.path()));
        assert!(devices.list_registered().is_err());
    }
}
