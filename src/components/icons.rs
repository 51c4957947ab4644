//! Centralized icon definitions.
//!
//! Icon theme is configured in `config.rs` via `ICON_THEME`.
//! This module maps semantic icon names to the selected theme's icons.

use icondata::Icon;

use crate::config::IconTheme;
use crate::utils::file_types::{FileKind, file_kind};

// =============================================================================
// Theme Imports
// =============================================================================

mod lucide {
    pub use icondata::{
        LuArchive as Archive, LuArrowDown as ArrowDown, LuArrowUp as ArrowUp, LuBookOpen as FilePdf,
        LuChevronDown as ChevronDown, LuChevronRight as ChevronRight, LuClock as Clock,
        LuDownload as Download, LuEye as Eye, LuFile as File, LuFilePlus as FilePlus,
        LuFileText as FileText, LuFolder as Folder, LuFolderInput as Move,
        LuFolderOpen as FolderOpen, LuFolderPlus as FolderPlus, LuHouse as Home,
        LuImage as FileImage, LuLayoutGrid as Grid, LuList as List, LuLogOut as LogOut,
        LuMoon as Moon, LuPanelLeft as Sidebar, LuPencil as Edit, LuRefreshCw as Refresh,
        LuRotateCcw as Restore, LuSave as Save, LuSearch as Search, LuSun as Sun, LuTrash2 as Trash,
        LuUpload as Upload, LuUser as User, LuX as Close,
    };
}

mod bootstrap {
    pub use icondata::{
        BsArchive as Archive, BsArrowClockwise as Refresh, BsArrowCounterclockwise as Restore,
        BsArrowDown as ArrowDown, BsArrowUp as ArrowUp, BsBoxArrowRight as LogOut,
        BsChevronDown as ChevronDown, BsChevronRight as ChevronRight, BsClock as Clock,
        BsDownload as Download, BsEye as Eye, BsFileEarmark as File,
        BsFileEarmarkImage as FileImage, BsFileEarmarkPdf as FilePdf, BsFileEarmarkPlus as FilePlus,
        BsFileEarmarkText as FileText, BsFolder2Open as FolderOpen, BsFolderFill as Folder,
        BsFolderPlus as FolderPlus, BsFolderSymlink as Move, BsGrid as Grid, BsHouseFill as Home,
        BsLayoutSidebar as Sidebar, BsListUl as List, BsMoonFill as Moon, BsPencil as Edit,
        BsPerson as User, BsSave as Save, BsSearch as Search, BsSunFill as Sun, BsTrash as Trash,
        BsUpload as Upload, BsXLg as Close,
    };
}

// =============================================================================
// Icon Constants (selected based on theme)
// =============================================================================

macro_rules! themed_icon {
    ($name:ident, $theme_name:ident) => {
        pub const $name: Icon = match crate::config::ICON_THEME {
            IconTheme::Lucide => lucide::$theme_name,
            IconTheme::Bootstrap => bootstrap::$theme_name,
        };
    };
}

themed_icon!(CHEVRON_RIGHT, ChevronRight);
themed_icon!(ARROW_UP, ArrowUp);
themed_icon!(ARROW_DOWN, ArrowDown);
themed_icon!(CHEVRON_DOWN, ChevronDown);
themed_icon!(HOME, Home);
themed_icon!(FOLDER, Folder);
themed_icon!(FOLDER_OPEN, FolderOpen);
themed_icon!(FOLDER_PLUS, FolderPlus);
themed_icon!(FILE, File);
themed_icon!(FILE_PLUS, FilePlus);
themed_icon!(FILE_TEXT, FileText);
themed_icon!(FILE_PDF, FilePdf);
themed_icon!(FILE_IMAGE, FileImage);
themed_icon!(ARCHIVE, Archive);
themed_icon!(SEARCH, Search);
themed_icon!(LIST, List);
themed_icon!(GRID, Grid);
themed_icon!(CLOSE, Close);
themed_icon!(EDIT, Edit);
themed_icon!(EYE, Eye);
themed_icon!(SAVE, Save);
themed_icon!(UPLOAD, Upload);
themed_icon!(DOWNLOAD, Download);
themed_icon!(TRASH, Trash);
themed_icon!(RESTORE, Restore);
themed_icon!(REFRESH, Refresh);
themed_icon!(MOVE, Move);
themed_icon!(CLOCK, Clock);
themed_icon!(SUN, Sun);
themed_icon!(MOON, Moon);
themed_icon!(SIDEBAR, Sidebar);
themed_icon!(USER, User);
themed_icon!(LOG_OUT, LogOut);

/// Icon for a file, picked by the kind of its name.
pub fn for_file_name(name: &str) -> Icon {
    match file_kind(name) {
        FileKind::Text | FileKind::Code => FILE_TEXT,
        FileKind::Pdf => FILE_PDF,
        FileKind::Image => FILE_IMAGE,
        FileKind::Archive => ARCHIVE,
        _ => FILE,
    }
}
