//! Latest-wins single-slot channel.
//!
//! Le producteur ne bloque jamais : une nouvelle valeur remplace la valeur non
//! lue. Le sentinel `Stop` est prioritaire et n'est jamais écrasé par une frame.

use std::time::Duration;

use flume::{Receiver, Sender, TryRecvError, TrySendError};

/// Message transporté par le slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<T> {
    /// Une valeur (frame, mosaïque…).
    Item(T),
    /// Demande d'arrêt coopératif.
    Stop,
}

/// Résultat d'un envoi non bloquant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// Le slot était vide.
    Delivered,
    /// Une valeur non lue a été jetée au profit de la nouvelle.
    Replaced,
    /// Le slot contient déjà `Stop` ; la valeur est jetée.
    Refused,
}

/// Résultat d'une réception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received<T> {
    /// Valeur la plus récente.
    Item(T),
    /// `Stop` reçu ou producteur disparu.
    Stopped,
    /// Rien de disponible pour l'instant.
    Empty,
}

/// The consumer side was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotClosed;

impl std::fmt::Display for SlotClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("slot closed: consumer dropped")
    }
}

impl std::error::Error for SlotClosed {}

/// Producer half. Holds a receiver clone to evict unread values.
pub struct SlotSender<T> {
    tx: Sender<Slot<T>>,
    evict: Receiver<Slot<T>>,
}

/// Consumer half.
pub struct SlotReceiver<T> {
    rx: Receiver<Slot<T>>,
}

/// Crée un slot latest-wins.
///
/// # Example
/// ```
/// use gm_core::slot::{latest_slot, Offer, Received};
/// let (tx, rx) = latest_slot();
/// assert_eq!(tx.publish(1).unwrap(), Offer::Delivered);
/// assert_eq!(tx.publish(2).unwrap(), Offer::Replaced);
/// assert_eq!(rx.try_recv(), Received::Item(2));
/// assert_eq!(rx.try_recv(), Received::Empty);
/// ```
#[must_use]
pub fn latest_slot<T>() -> (SlotSender<T>, SlotReceiver<T>) {
    let (tx, rx) = flume::bounded(1);
    (
        SlotSender {
            tx,
            evict: rx.clone(),
        },
        SlotReceiver { rx },
    )
}

impl<T> SlotSender<T> {
    /// Publie `value` sans bloquer, en remplaçant toute valeur non lue.
    ///
    /// # Errors
    /// Returns [`SlotClosed`] if the receiver was dropped.
    pub fn publish(&self, value: T) -> Result<Offer, SlotClosed> {
        self.offer(Slot::Item(value))
    }

    /// Pousse le sentinel d'arrêt. Écrase une valeur non lue.
    ///
    /// # Errors
    /// Returns [`SlotClosed`] if the receiver was dropped.
    pub fn stop(&self) -> Result<Offer, SlotClosed> {
        self.offer(Slot::Stop)
    }

    /// True once the consumer half is gone.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        // Le receiver interne `evict` compte pour un.
        self.tx.receiver_count() <= 1
    }

    /// True when no value is waiting to be read.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    fn offer(&self, msg: Slot<T>) -> Result<Offer, SlotClosed> {
        if self.is_closed() {
            return Err(SlotClosed);
        }
        let mut msg = msg;
        let mut replaced = false;
        loop {
            match self.tx.try_send(msg) {
                Ok(()) => {
                    return Ok(if replaced {
                        Offer::Replaced
                    } else {
                        Offer::Delivered
                    });
                }
                Err(TrySendError::Disconnected(_)) => return Err(SlotClosed),
                Err(TrySendError::Full(back)) => {
                    msg = back;
                    match self.evict.try_recv() {
                        Ok(Slot::Stop) => {
                            // Stop reste en place, quelle que soit la valeur offerte.
                            // Producteur unique (SlotSender n'est pas Clone) : le slot
                            // vient d'être vidé, il ne peut pas être plein.
                            let restored = self.tx.try_send(Slot::Stop);
                            debug_assert!(!matches!(restored, Err(TrySendError::Full(_))));
                            return Ok(if matches!(msg, Slot::Stop) {
                                Offer::Delivered
                            } else {
                                Offer::Refused
                            });
                        }
                        Ok(Slot::Item(_)) => replaced = true,
                        // Le consommateur a vidé le slot entre-temps.
                        Err(_) => {}
                    }
                }
            }
        }
    }
}

impl<T> SlotReceiver<T> {
    /// Attend la prochaine valeur. `None` sur `Stop` ou si le producteur a disparu.
    #[must_use]
    pub fn recv(&self) -> Option<T> {
        match self.rx.recv() {
            Ok(Slot::Item(v)) => Some(v),
            Ok(Slot::Stop) | Err(_) => None,
        }
    }

    /// Lecture non bloquante.
    #[must_use]
    pub fn try_recv(&self) -> Received<T> {
        match self.rx.try_recv() {
            Ok(Slot::Item(v)) => Received::Item(v),
            Ok(Slot::Stop) | Err(TryRecvError::Disconnected) => Received::Stopped,
            Err(TryRecvError::Empty) => Received::Empty,
        }
    }

    /// Attend au plus `timeout`.
    #[must_use]
    pub fn recv_timeout(&self, timeout: Duration) -> Received<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(Slot::Item(v)) => Received::Item(v),
            Ok(Slot::Stop) | Err(flume::RecvTimeoutError::Disconnected) => Received::Stopped,
            Err(flume::RecvTimeoutError::Timeout) => Received::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn newest_value_wins() {
        let (tx, rx) = latest_slot();
        for i in 0..10 {
            tx.publish(i).unwrap();
        }
        assert_eq!(rx.try_recv(), Received::Item(9));
        assert_eq!(rx.try_recv(), Received::Empty);
    }

    #[test]
    fn stop_overwrites_pending_item() {
        let (tx, rx) = latest_slot();
        tx.publish("frame").unwrap();
        assert_eq!(tx.stop().unwrap(), Offer::Replaced);
        assert_eq!(rx.recv(), None);
    }

    #[test]
    fn stop_survives_later_publish() {
        let (tx, rx) = latest_slot();
        tx.stop().unwrap();
        assert_eq!(tx.publish(42).unwrap(), Offer::Refused);
        assert_eq!(tx.stop().unwrap(), Offer::Delivered);
        assert_eq!(rx.try_recv(), Received::<i32>::Stopped);
    }

    #[test]
    fn stop_is_restored_after_every_eviction() {
        let (tx, rx) = latest_slot();
        tx.stop().unwrap();
        let producer = thread::spawn(move || {
            for i in 0..500u32 {
                assert_eq!(tx.publish(i).unwrap(), Offer::Refused);
            }
        });
        producer.join().unwrap();
        assert_eq!(rx.try_recv(), Received::Stopped);
    }

    #[test]
    fn dropped_producer_reads_as_stopped() {
        let (tx, rx) = latest_slot::<u8>();
        drop(tx);
        assert_eq!(rx.try_recv(), Received::Stopped);
        assert_eq!(rx.recv(), None);
    }

    #[test]
    fn dropped_consumer_closes_slot() {
        let (tx, rx) = latest_slot::<u8>();
        drop(rx);
        assert!(tx.is_closed());
        assert_eq!(tx.publish(1), Err(SlotClosed));
    }

    #[test]
    fn publish_never_blocks_a_slow_consumer() {
        let (tx, rx) = latest_slot();
        let producer = thread::spawn(move || {
            for i in 0..1_000u32 {
                tx.publish(i).unwrap();
            }
            tx.stop().unwrap();
        });
        producer.join().unwrap();
        // Seul le sentinel reste : toutes les frames ont été écrasées.
        assert_eq!(rx.recv(), None);
    }

    #[test]
    fn timeout_reports_empty() {
        let (_tx, rx) = latest_slot::<u8>();
        assert_eq!(rx.recv_timeout(Duration::from_millis(5)), Received::Empty);
    }
}
