//! Static role menus.

use common::define_kind;

use crate::domain::Role;

define_kind! {
    #[doc = "Icon of a menu [`Item`]."]
    enum Icon {
        #[doc = "Dashboard overview."]
        Dashboard,

        #[doc = "Group of users."]
        Users,

        #[doc = "Graduation cap."]
        GraduationCap,

        #[doc = "Open book."]
        BookOpen,

        #[doc = "QR code."]
        QrCode,

        #[doc = "Clipboard list."]
        ClipboardList,

        #[doc = "Bar chart."]
        BarChart,
    }
}

/// Entry of a menu [`Section`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Item {
    /// Path the [`Item`] leads to.
    pub path: &'static str,

    /// Human-readable label.
    pub label: &'static str,

    /// [`Icon`] shown next to the label.
    pub icon: Icon,
}

impl Item {
    const fn new(path: &'static str, icon: Icon, label: &'static str) -> Self {
        Self { path, label, icon }
    }

    /// Indicates whether this [`Item`] is active on the `current` path.
    ///
    /// Role home items are active on their exact path only, so that nested
    /// screens highlight their own items.
    #[must_use]
    pub fn is_active(&self, current: &str, role: Role) -> bool {
        let current = super::route::normalize(current);
        if self.path == role.home_path() {
            return current == self.path;
        }
        current == self.path
            || current
                .strip_prefix(self.path)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Titled group of menu [`Item`]s.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Section {
    /// Title of the [`Section`].
    pub title: &'static str,

    /// [`Item`]s of the [`Section`], in display order.
    pub items: &'static [Item],
}

const ATTENDANCE: Item =
    Item::new("/attendance-history", Icon::ClipboardList, "Attendance");
const MONTHLY_REPORT: Item =
    Item::new("/monthly-report", Icon::BarChart, "Monthly Report");

const ADMIN: &[Section] = &[
    Section {
        title: "Main",
        items: &[
            Item::new("/admin", Icon::Dashboard, "Dashboard"),
            Item::new("/admin/teachers", Icon::Users, "Teachers"),
            Item::new("/admin/students", Icon::GraduationCap, "Students"),
            Item::new("/admin/classes", Icon::BookOpen, "Classes"),
        ],
    },
    Section {
        title: "Reports",
        items: &[ATTENDANCE, MONTHLY_REPORT],
    },
];

const TEACHER: &[Section] = &[
    Section {
        title: "Main",
        items: &[
            Item::new("/teacher", Icon::Dashboard, "Dashboard"),
            Item::new("/teacher/classes", Icon::BookOpen, "My Classes"),
            Item::new("/scanner", Icon::QrCode, "QR Scanner"),
        ],
    },
    Section {
        title: "Reports",
        items: &[ATTENDANCE, MONTHLY_REPORT],
    },
];

const STUDENT: &[Section] = &[Section {
    title: "Main",
    items: &[
        Item::new("/student", Icon::Dashboard, "Dashboard"),
        Item::new("/student/qr", Icon::QrCode, "My QR Code"),
        ATTENDANCE,
        MONTHLY_REPORT,
    ],
}];

const PARENT: &[Section] = &[Section {
    title: "Main",
    items: &[
        Item::new("/parent", Icon::Dashboard, "Dashboard"),
        Item::new(
            "/attendance-history",
            Icon::ClipboardList,
            "Child Attendance",
        ),
        MONTHLY_REPORT,
    ],
}];

/// Returns the menu [`Section`]s of the provided [`Role`].
#[must_use]
pub const fn for_role(role: Role) -> &'static [Section] {
    match role {
        Role::Admin => ADMIN,
        Role::Teacher => TEACHER,
        Role::Student => STUDENT,
        Role::Parent => PARENT,
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{user::session::Token, Role, Session},
        navigation::{navigate, Decision},
    };

    use super::for_role;

    #[test]
    fn every_item_is_reachable_by_its_role() {
        for &role in Role::ALL {
            let session = Session {
                profile: serde_json::from_value(serde_json::json!({
                    "id": 1,
                    "name": "Any One",
                    "role": role.as_str(),
                }))
                .unwrap(),
                token: Token::new("token").unwrap(),
            };

            let items = for_role(role).iter().flat_map(|s| s.items);
            for item in items {
                assert_eq!(
                    navigate(item.path, Some(&session)),
                    Decision::Render,
                    "{role} -> {}",
                    item.path,
                );
            }
        }
    }

    #[test]
    fn home_item_is_active_on_exact_path_only() {
        let home = for_role(Role::Admin)[0].items[0];
        let teachers = for_role(Role::Admin)[0].items[1];

        assert!(home.is_active("/admin", Role::Admin));
        assert!(!home.is_active("/admin/teachers", Role::Admin));
        assert!(teachers.is_active("/admin/teachers/", Role::Admin));
    }

    #[test]
    fn parent_menu_has_no_scanner() {
        let paths = for_role(Role::Parent)
            .iter()
            .flat_map(|s| s.items)
            .map(|i| i.path)
            .collect::<Vec<_>>();

        assert_eq!(
            paths,
            ["/parent", "/attendance-history", "/monthly-report"],
        );
    }
}
