use std::time::Duration;

use crate::core::dev::{
    Device,
    Error,
    Result,
};
use crate::core::repr::EthernetAddress;
use crate::linux::libc as _libc;

/// [TAP interface](https://www.kernel.org/doc/Documentation/networking/tuntap.txt)
/// for sending and receiving raw ethernet frames.
///
/// The descriptor is non-blocking. Use Device::wait(...) to block until a
/// frame arrives.
pub struct Tap {
    fd: libc::c_int,
    max_transmission_unit: usize,
    eth_addr: EthernetAddress,
}

impl Tap {
    /// Creates or binds to an existing TAP interface with the specified name.
    ///
    /// The device answers with the hardware address of the interface unless
    /// one is set with with_ethernet_addr(...).
    pub fn new(ifr_name: &str) -> Result<Tap> {
        let ifreq = _libc::c_ifreq::with_name(ifr_name).ok_or_else(|| {
            Error::IO(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Interface name {:?} is too long.", ifr_name),
            ))
        })?;

        let fd = unsafe {
            libc::open(
                "/dev/net/tun\0".as_ptr() as *const libc::c_char,
                libc::O_RDWR | libc::O_NONBLOCK,
            )
        };

        if fd == -1 {
            return Err(Error::IO(std::io::Error::last_os_error()));
        }

        // Close the descriptor on any error from here on.
        let mut tap = Tap {
            fd,
            max_transmission_unit: 0,
            eth_addr: EthernetAddress::NULL,
        };

        let mut _ifreq = ifreq;
        _ifreq.ifr_ifru.ifr_flags = _libc::IFF_TAP | _libc::IFF_NO_PI;
        if unsafe { libc::ioctl(fd, _libc::TUNSETIFF as _, &mut _ifreq as *mut _libc::c_ifreq) }
            == -1
        {
            return Err(Error::IO(std::io::Error::last_os_error()));
        }

        let mut _ifreq = ifreq;
        Self::inet_ioctl(_libc::SIOCGIFMTU, &mut _ifreq)?;
        tap.max_transmission_unit = unsafe { _ifreq.ifr_ifru.ifr_mtu } as usize;

        let mut _ifreq = ifreq;
        Self::inet_ioctl(_libc::SIOCGIFHWADDR, &mut _ifreq)?;
        let c_addr = unsafe { _ifreq.ifr_ifru.ifr_hwaddr };
        if c_addr.sa_family != _libc::ARPHRD_ETHER {
            return Err(Error::IO(std::io::Error::new(
                std::io::ErrorKind::Other,
                "Ethernet address not found.",
            )));
        }

        let mut eth_addr = [0; 6];
        for i in 0 .. 6 {
            eth_addr[i] = c_addr.sa_data[i] as u8;
        }
        tap.eth_addr = EthernetAddress::new(eth_addr);

        Ok(tap)
    }

    /// Overrides the Ethernet address the device reports.
    pub fn with_ethernet_addr(mut self, eth_addr: EthernetAddress) -> Tap {
        self.eth_addr = eth_addr;
        self
    }

    fn inet_ioctl(request: libc::c_ulong, ifreq: &mut _libc::c_ifreq) -> Result<()> {
        unsafe {
            let fd = libc::socket(libc::AF_INET, libc::SOCK_DGRAM, 0);

            if fd == -1 {
                return Err(Error::IO(std::io::Error::last_os_error()));
            }

            if libc::ioctl(fd, request as _, ifreq as *mut _libc::c_ifreq) == -1 {
                let err = std::io::Error::last_os_error();
                libc::close(fd);
                return Err(Error::IO(err));
            }

            libc::close(fd);
            Ok(())
        }
    }

    /// Polls the descriptor for input, waiting up to timeout_ms (-1 waits
    /// forever).
    fn poll_in(&self, timeout_ms: libc::c_int) -> Result<bool> {
        let mut pollfd = libc::pollfd {
            fd: self.fd,
            events: libc::POLLIN,
            revents: 0,
        };

        match unsafe { libc::poll(&mut pollfd, 1, timeout_ms) } {
            -1 if _libc::errno() == libc::EINTR => Ok(false),
            -1 => Err(Error::IO(std::io::Error::last_os_error())),
            0 => Ok(false),
            _ => Ok(pollfd.revents & libc::POLLIN != 0),
        }
    }
}

impl Device for Tap {
    fn send(&mut self, buffer: &[u8]) -> Result<()> {
        let wrote = unsafe {
            libc::write(
                self.fd,
                buffer.as_ptr() as *const libc::c_void,
                buffer.len(),
            )
        };

        if wrote < 0 && _libc::errno() == libc::EAGAIN {
            Err(Error::Busy)
        } else if wrote < 0 {
            Err(Error::IO(std::io::Error::last_os_error()))
        } else {
            Ok(())
        }
    }

    fn recv(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let read = unsafe {
            libc::read(
                self.fd,
                buffer.as_mut_ptr() as *mut libc::c_void,
                buffer.len(),
            )
        };

        if read < 0 && _libc::errno() == libc::EAGAIN {
            Err(Error::Nothing)
        } else if read < 0 {
            Err(Error::IO(std::io::Error::last_os_error()))
        } else {
            Ok(read as usize)
        }
    }

    fn max_transmission_unit(&self) -> usize {
        self.max_transmission_unit
    }

    fn ethernet_addr(&self) -> EthernetAddress {
        self.eth_addr
    }

    fn is_readable(&self) -> bool {
        match self.poll_in(0) {
            Ok(readable) => readable,
            Err(err) => {
                warn!("Polling TAP failed with {:?}.", err);
                false
            }
        }
    }

    fn wait(&mut self, timeout: Option<Duration>) -> Result<bool> {
        let timeout_ms = match timeout {
            Some(timeout) => {
                let ms = timeout.as_secs() * 1000 + u64::from(timeout.subsec_millis());
                std::cmp::min(ms, libc::c_int::max_value() as u64) as libc::c_int
            }
            None => -1,
        };

        self.poll_in(timeout_ms)
    }
}

impl Drop for Tap {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}
